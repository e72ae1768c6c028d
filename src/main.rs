use flowgarden::{Scene, SceneConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = SceneConfig::from_args(std::env::args().skip(1))
        .and_then(|config| Scene::from_config(config).run());

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
