fn main() {
    if let Err(err) = finance_pipeline::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
