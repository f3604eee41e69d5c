fn main() {
    if let Err(e) = dust_cli::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
