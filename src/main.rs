mod cli;
mod common;
mod prime;

fn main() -> anyhow::Result<()> {
    cli::run()
}
