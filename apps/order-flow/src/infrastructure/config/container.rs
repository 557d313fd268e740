//! Dependency Injection Container
//!
//! Wires configuration and a session engine into the run components.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::dto::RunReport;
use crate::application::ports::{SessionEvent, SessionPort};
use crate::application::services::{CancellationError, RunContext, SessionEventDispatcher};
use crate::application::use_cases::{RunScenarioUseCase, RunSettings};
use crate::config::Config;
use crate::domain::generation::{GenerationError, RandomOrderGenerator};
use crate::infrastructure::session::SimulatedVenue;

/// Errors raised while wiring the application.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Generator settings rejected.
    #[error("invalid generator settings: {0}")]
    Generator(#[from] GenerationError),

    /// Cancel settings rejected.
    #[error("invalid cancel settings: {0}")]
    Cancellation(#[from] CancellationError),
}

/// Dependency injection container.
///
/// Holds the shared run state and the session port. Every component built
/// from one container shares the same ledger, statistics and gate.
pub struct Container<S>
where
    S: SessionPort + 'static,
{
    settings: RunSettings,
    generator: RandomOrderGenerator,
    context: RunContext,
    session: Arc<S>,
}

impl<S> Container<S>
where
    S: SessionPort + 'static,
{
    /// Build a container from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the generator or cancel settings are invalid.
    pub fn new(config: &Config, session: Arc<S>) -> Result<Self, ContainerError> {
        let generator = RandomOrderGenerator::new(config.generator_config())?;
        let context = RunContext::new(
            config.symbols(),
            config.cancellation.probability,
            config.cancellation.retry_policy(),
        )?;

        Ok(Self {
            settings: config.run_settings(),
            generator,
            context,
            session,
        })
    }

    /// Get the session port.
    pub fn session(&self) -> Arc<S> {
        Arc::clone(&self.session)
    }

    /// Shared run state.
    pub const fn context(&self) -> &RunContext {
        &self.context
    }

    /// Create a `SessionEventDispatcher`.
    pub fn dispatcher(&self) -> SessionEventDispatcher<S> {
        SessionEventDispatcher::new(self.context.clone(), Arc::clone(&self.session))
    }

    /// Spawn the dispatcher over a session event stream.
    pub fn spawn_dispatcher(
        &self,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> JoinHandle<()> {
        let dispatcher = self.dispatcher();
        tokio::spawn(async move { dispatcher.run(events).await })
    }

    /// Create a `RunScenarioUseCase`.
    pub fn run_scenario_use_case(&self) -> RunScenarioUseCase<S> {
        RunScenarioUseCase::new(
            self.settings,
            self.generator.clone(),
            self.context.clone(),
            Arc::clone(&self.session),
        )
    }
}

/// Run one scenario against the in-process simulated venue.
///
/// # Errors
///
/// Returns error if the configuration cannot be wired.
pub async fn run_simulated(config: &Config) -> Result<RunReport, ContainerError> {
    let (venue, events) = SimulatedVenue::new(
        config.venue.clone(),
        config.reference_prices(),
        config.instruments.price_decimals,
    );
    let venue = Arc::new(venue);
    let container = Container::new(config, Arc::clone(&venue))?;

    let dispatcher = container.spawn_dispatcher(events);
    venue.logon();

    let report = container.run_scenario_use_case().execute().await;

    // The use case closes the session, which ends the event stream.
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "Dispatcher task failed");
    }
    Ok(report)
}
