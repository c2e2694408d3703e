fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = teamtree_canvas::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
