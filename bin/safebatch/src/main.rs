fn main() {
    if let Err(err) = safebatch::cli::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
