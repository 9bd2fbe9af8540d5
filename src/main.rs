fn main() {
    if let Err(e) = ember::cli::main() {
        eprintln!("❌ Unexpected error: {e}");
        std::process::exit(1);
    }
}
