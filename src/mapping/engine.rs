//! Translation engine with statum state machine
//!
//! Wraps the [`BatchTranslator`] in a 5-state lifecycle with compile-time
//! state safety. The engine runs in its own tokio task and processes chat
//! commands strictly one after another, so the lockout state is never touched
//! by two commands at once.
//!
//! # State Machine
//!
//! ```text
//! Initializing ──► Configured ──► Active ──► Deactivating ──► Deactivated
//!       │                            │
//!  (profile validation)        (shutdown signal or
//!                               closed command channel)
//! ```
//!
//! # Architecture
//!
//! ```text
//! ChatCommand ──► [BatchTranslator] ──► Actuator
//!      ▲                 │
//!  Input Channel         └──────────► Sink
//! ```

use crate::actuator::Actuator;
use crate::mapping::lockout::Clock;
use crate::mapping::{BatchTranslator, ChatCommand, DispatchSettings, Dispatcher, MappingError};
use crate::profile::Profile;
use crate::telemetry::Sink;
use statum::{machine, state};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// States for translation engine lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum TranslationEngineState {
    Initializing, // Setting up engine structure
    Configured,   // Profile validated, dispatcher built
    Active,       // Processing commands in main loop
    Deactivating, // Shutting down gracefully
    Deactivated,  // Fully stopped, ready for cleanup
}

/// Collaborators the dispatcher emits to
#[derive(Clone)]
pub struct EngineComponents {
    pub actuator: Arc<dyn Actuator>,
    pub sink: Arc<dyn Sink>,
    pub clock: Arc<dyn Clock>,
}

/// Translation engine with compile-time state safety via statum
#[machine]
pub struct TranslationEngine<S: TranslationEngineState> {
    command_receiver: mpsc::Receiver<ChatCommand>,
    name: String,
    translator: Option<BatchTranslator>,
    processed: u64,
}

impl<S: TranslationEngineState> TranslationEngine<S> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Number of commands handled so far
    pub fn processed(&self) -> u64 {
        self.processed
    }
}

impl TranslationEngine<Initializing> {
    pub fn create(command_receiver: mpsc::Receiver<ChatCommand>, name: String) -> Self {
        info!("Initializing new translation engine: {}", name);

        Self::new(
            command_receiver,
            name,
            None, // translator
            0,    // processed
        )
    }

    /// Validates the profile, builds the dispatcher and transitions to Configured
    pub fn configure(
        mut self,
        profile: Profile,
        components: EngineComponents,
        settings: DispatchSettings,
    ) -> Result<TranslationEngine<Configured>, MappingError> {
        info!("Configuring translation engine: {} ({})", self.name, profile.id);

        match Dispatcher::new(
            profile,
            components.actuator,
            components.sink,
            components.clock,
            settings,
        ) {
            Ok(dispatcher) => {
                self.translator = Some(BatchTranslator::new(dispatcher));
                info!("Engine configured successfully: {}", self.name);
                Ok(self.transition())
            }
            Err(e) => {
                error!("Failed to configure engine: {}", e);
                Err(MappingError::InitializationError(format!(
                    "Failed to configure engine: {}",
                    e
                )))
            }
        }
    }
}

impl TranslationEngine<Configured> {
    pub fn activate(self) -> TranslationEngine<Active> {
        info!("Activating translation engine: {}", self.name);
        self.transition()
    }
}

impl TranslationEngine<Active> {
    /// Translates a single chat command
    pub fn process_command(&mut self, command: &ChatCommand) -> Result<(), MappingError> {
        let translator = match &self.translator {
            Some(t) => t,
            None => {
                return Err(MappingError::InitializationError(
                    "No translator available".to_string(),
                ))
            }
        };

        translator.translate(&command.text, command.author.as_deref(), command.player);
        self.processed += 1;
        Ok(())
    }

    /// Main processing loop with graceful shutdown support
    ///
    /// Runs until the shutdown signal arrives or every command sender is gone.
    pub async fn run_until_shutdown(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> Result<TranslationEngine<Deactivating>, MappingError> {
        info!("Starting command processing loop for: {}", self.name);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received for: {}", self.name);
                    break;
                }

                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => {
                            debug!("Processing {}", command);
                            if let Err(e) = self.process_command(&command) {
                                error!("Error processing command: {}", e);
                            }
                        }
                        None => {
                            info!("Command channel closed for: {}", self.name);
                            break;
                        }
                    }
                }
            }
        }

        info!("Transitioning to Deactivating state: {}", self.name);
        Ok(self.transition())
    }
}

impl TranslationEngine<Deactivating> {
    pub async fn shutdown(self) -> TranslationEngine<Deactivated> {
        info!(
            "Shutting down translation engine: {} after {} commands",
            self.name, self.processed
        );
        self.transition()
    }
}

/// Handle for managing the translation engine in a tokio task
#[derive(Debug)]
pub struct TranslationEngineHandle {
    pub name: String,

    task_handle: Option<JoinHandle<Result<u64, MappingError>>>,

    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TranslationEngineHandle {
    pub fn new(name: String) -> Self {
        Self {
            name,
            task_handle: None,
            shutdown_tx: None,
        }
    }

    /// Starts engine in tokio task and returns the command sender
    ///
    /// Profile validation happens here, so a broken profile fails before any
    /// command is accepted.
    pub fn start(
        &mut self,
        profile: Profile,
        components: EngineComponents,
        settings: DispatchSettings,
        queue_capacity: usize,
    ) -> Result<mpsc::Sender<ChatCommand>, MappingError> {
        let (command_sender, command_receiver) = mpsc::channel(queue_capacity.max(1));
        let engine_name = self.name.clone();
        let engine = TranslationEngine::create(command_receiver, engine_name.clone())
            .configure(profile, components, settings)?;

        let active_engine = engine.activate();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);
        let task_handle = tokio::spawn(async move {
            info!("Spawning running engine: {}", engine_name);
            match active_engine.run_until_shutdown(shutdown_rx).await {
                Ok(deactivating_engine) => {
                    let deactivated = deactivating_engine.shutdown().await;
                    Ok(deactivated.processed())
                }
                Err(e) => {
                    error!("Error running engine: {} - {}", engine_name, e);
                    Err(e)
                }
            }
        });

        self.task_handle = Some(task_handle);

        info!("Translation engine activated: {}", self.name);
        Ok(command_sender)
    }

    /// Gracefully shuts down engine and waits for task completion
    ///
    /// Returns the number of processed commands.
    pub async fn shutdown(&mut self) -> Result<u64, MappingError> {
        debug!("Sending shutdown signal to engine: {}", self.name);

        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Engine task already terminated: {}", self.name);
            }
        }

        self.join().await
    }

    /// Waits until the engine stops on its own, e.g. after all senders are dropped
    pub async fn join(&mut self) -> Result<u64, MappingError> {
        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => {
                    debug!("Engine task completed: {}", self.name);
                    result
                }
                Err(e) => {
                    error!("Engine task panicked: {} - {}", self.name, e);
                    Err(MappingError::ThreadError(format!(
                        "Engine task panicked: {}",
                        e
                    )))
                }
            }
        } else {
            debug!("Engine already shut down: {}", self.name);
            Ok(0)
        }
    }
}
