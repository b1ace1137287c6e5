pub mod audio;
pub mod error;
pub mod session;
pub mod shell;

use std::sync::Arc;

// Re-export for convenience
pub use audio::*;
pub use error::{AudioError, Result};
pub use session::{CutterSession, DecodeOutcome, DecodeRequest, LoadOutcome};
pub use shell::{run_shell, ShellOptions};

/// Run the interactive cutter on stdin/stdout with the symphonia decoder
///
/// Returns when the user quits or stdin closes.
pub async fn run(options: ShellOptions) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let decoder: Arc<dyn AudioDecoder> = Arc::new(SymphoniaDecoder::new());

    run_shell(decoder, options, stdin, std::io::stdout()).await?;
    Ok(())
}
