use std::path::PathBuf;
use std::rc::Rc;

use fxgraph::gpu::{HeadlessDevice, SharedDevice, TextureFormat};
use fxgraph::{
    Clock, GraphConfig, GraphRuntime, ManualClock, RuntimeOpts, ScreenCompositor, Value,
    builtin_registry,
};

const GRAPH: &str = include_str!("../tests/data/lfo_panel.json");

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = try_main() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let registry = builtin_registry()?;
    let cfg = GraphConfig::from_json_str(GRAPH, &registry)?;

    let device = Rc::new(HeadlessDevice::new(320, 240));
    let shared: SharedDevice = device.clone();
    let clock = Rc::new(ManualClock::new(0.0));
    let mut rt = GraphRuntime::builder(registry)
        .device(shared.clone())
        .clock(clock.clone())
        .opts(RuntimeOpts {
            width: 128,
            height: 128,
            format: TextureFormat::Rgba8,
        })
        .build(&cfg)?;
    ScreenCompositor::new(shared, "panel").attach(&mut rt);

    rt.start();
    for _ in 0..8 {
        if !rt.step() {
            break;
        }
        let lfo = rt.output("lfo").and_then(Value::as_f64).unwrap_or_default();
        let intensity = rt
            .node("panel")
            .and_then(|n| n.last_input().get("intensity"))
            .and_then(Value::as_f64)
            .unwrap_or_default();
        eprintln!(
            "tick {:>2}  t={:.1}s  lfo={lfo:.3}  panel.intensity={intensity:.3}",
            rt.tick_count() - 1,
            clock.now_seconds()
        );
        clock.advance(0.5);
    }
    rt.stop();

    let screen = device
        .screen_image()
        .ok_or_else(|| anyhow::anyhow!("screen buffer has the wrong size"))?;
    let out_dir = PathBuf::from("target").join("demos");
    std::fs::create_dir_all(&out_dir)?;
    let out_path = out_dir.join("lfo_panel.png");
    screen.save_with_format(&out_path, image::ImageFormat::Png)?;
    eprintln!("wrote {}", out_path.display());
    Ok(())
}
