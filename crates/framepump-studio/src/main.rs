mod pulse;

use anyhow::Result;

use framepump_engine::device::GpuInit;
use framepump_engine::logging::{init_logging, LoggingConfig};
use framepump_engine::pump::LoopConfig;
use framepump_engine::window::{Runtime, RuntimeConfig};

use pulse::PulseSurface;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let loop_config = LoopConfig::default();

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║            FRAMEPUMP STUDIO            ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  Shift+P   pause / resume render time  ║");
    println!("  ║  Esc       quit                        ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let gpu_init = GpuInit::default();
    Runtime::run(
        RuntimeConfig {
            title: "framepump studio".to_string(),
            ..RuntimeConfig::default()
        },
        loop_config,
        move |window| PulseSurface::new(window, gpu_init.clone()),
    )
}
