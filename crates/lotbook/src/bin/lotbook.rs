//! lotbook - Cost basis and lot accounting.

fn main() -> std::process::ExitCode {
    lotbook::cmd::main()
}
