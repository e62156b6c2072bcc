fn main() {
    let cli = docstore_erd::cli::parse();
    let code = docstore_erd::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
