// Binary entry point for codeai-backend
// This is a thin wrapper that delegates to the library implementation

use anyhow::Result;
use codeai_backend::shell;

fn main() -> Result<()> {
    // Bootstrap before the runtime exists: it may export variables into the
    // process environment, which must happen while single-threaded.
    let config = shell::bootstrap()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        if let Err(e) = shell::run(config).await {
            eprintln!("codeai-backend fatal error: {:#}", e);
            return Err(e);
        }
        Ok(())
    })
}
