fn main() {
    if let Err(e) = senpuki::app::run() {
        log::error!("{e:#}");
        eprintln!("senpuki: {e:#}");
        std::process::exit(1);
    }
}
