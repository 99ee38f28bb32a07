fn main() {
    std::process::exit(docs2client_cli::run());
}
