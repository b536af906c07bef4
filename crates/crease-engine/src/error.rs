use thiserror::Error;

/// Errors surfaced by the engine to the host.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collaborator required at startup could not be created.
    #[error("failed to initialize {component}: {reason}")]
    InitializationFailure {
        component: &'static str,
        reason: String,
    },

    /// A named model or body was not present when it was needed.
    #[error("missing entity: {0}")]
    MissingEntity(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub fn init(component: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InitializationFailure {
            component,
            reason: reason.into(),
        }
    }

    /// Message suitable for showing to the player.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::InitializationFailure { .. } => {
                "The game could not start. Please refresh the page.".to_string()
            }
            EngineError::MissingEntity(_) => {
                "Something went wrong loading the game scene.".to_string()
            }
            EngineError::Config(msg) => format!("Invalid game settings: {}", msg),
        }
    }
}
