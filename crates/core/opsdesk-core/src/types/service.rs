//! Service types for stateful components

use crate::Result;
use async_trait::async_trait;

/// Service trait for stateful, long-running components
#[async_trait]
pub trait Service: Send + Sync {
    /// Service type name (unique identifier)
    fn service_type(&self) -> &str;

    /// Start the service (begin background tasks)
    async fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Stop the service (cleanup)
    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    /// Check if service is running
    fn is_running(&self) -> bool {
        false
    }

    /// Get service health status
    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::Healthy)
    }
}

/// Service health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServiceHealth {
    /// Service is healthy and operational
    Healthy,
    /// Service is degraded but functional
    Degraded,
    /// Service is unhealthy/not functional
    Unhealthy,
}
