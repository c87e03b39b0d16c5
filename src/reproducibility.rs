// Настройки воспроизводимости применяются один раз при старте процесса: зерно бэкэнда Burn
// и однопоточный пул rayon. Остальной код получает зёрна явно через свои конфигурации.

use burn::config::Config;
use burn::tensor::backend::Backend;

#[derive(Config, Debug)]
pub struct ReproducibilityConfig {
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = true)]
    pub single_threaded: bool,
}

impl ReproducibilityConfig {
    pub fn init<B: Backend>(&self) {
        B::seed(self.seed);

        if self.single_threaded {
            // Пул можно настроить только до первого использования
            if let Err(err) = rayon::ThreadPoolBuilder::new().num_threads(1).build_global() {
                tracing::warn!("Could not pin the global thread pool: {err}");
            }
        }

        tracing::info!(
            "Reproducibility: seed={}, single_threaded={}",
            self.seed,
            self.single_threaded
        );
    }
}
