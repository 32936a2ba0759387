mod rectangle;

use anyhow::Result;

use neonet_engine::device::GpuInit;
use neonet_engine::logging::{LoggingConfig, init_logging};
use neonet_engine::window::{Runtime, RuntimeConfig};

use rectangle::RectangleScene;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig::new("neonet", 800, 600);
    Runtime::run(config, GpuInit::default(), RectangleScene::new())
}
