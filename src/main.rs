fn main() {
    if let Err(err) = genogram_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
