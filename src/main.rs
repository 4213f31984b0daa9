fn main() {
    if let Err(e) = listwise::app::run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
