fn main() {
    if let Err(err) = blast_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
