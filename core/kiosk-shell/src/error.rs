use crate::commands::CommandError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: CommandError,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
