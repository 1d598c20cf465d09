use clipgen::repl::{start_repl, SessionConfig};

fn main() -> anyhow::Result<()> {
    clipgen::logging::init();
    start_repl(SessionConfig::default())
}
