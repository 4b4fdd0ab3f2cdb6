//! RGB Guardian entry point
//!
//! Native builds run in the terminal; wasm builds start the browser frontend.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    rgb_guardian::platform::web::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use rgb_guardian::platform::terminal::{self, Args, LogBuffer};

    let logs = LogBuffer::default();
    logs.init_logger();

    terminal::run(Args::parse(), &logs)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
