fn main() {
    if let Err(err) = borgvault::cli::run() {
        println!("{}", err);
        std::process::exit(2);
    }
}
