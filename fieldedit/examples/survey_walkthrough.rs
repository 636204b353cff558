//! This example drives an editing session without a user interface.
//!
//! A polygon is walked along with (simulated) GPS fixes and stored in an in-memory layer. Then a
//! second parcel is added and merged into the first one with the extend tool, and finally the
//! result is selected and deleted.
//!
//! ```shell
//! RUST_LOG=debug cargo run --example survey_walkthrough
//! ```

use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use fieldedit::control::PointerEvent;
use fieldedit::fieldedit_types::{Coordinate, GeometryKind, Size, Srid};
use fieldedit::geometry::part_count;
use fieldedit::group::PaletteButton;
use fieldedit::layer::MemoryLayer;
use fieldedit::{EditingConfig, EditingSession, MapView, Messenger, Notice};

struct ConsoleMessenger;

impl Messenger for ConsoleMessenger {
    fn request_redraw(&self) {}

    fn notify(&self, notice: Notice) {
        println!("> {notice}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let parcels = Arc::new(
        MemoryLayer::new("parcels", GeometryKind::Polygon, Srid::WEB_MERCATOR)
            .with_unique_geometries(),
    );
    let view = MapView::new(Coordinate { x: 11.35, y: 46.5 }, 17.0, Srid::WGS84)
        .with_size(Size::new(1080.0, 1920.0));

    let mut session = EditingSession::new(EditingConfig::default(), view)
        .with_messenger(Arc::new(ConsoleMessenger))
        .with_layers(vec![parcels.clone()])
        .with_edit_layer(parcels.clone());

    session.press(PaletteButton::CreateFeature)?;
    session.long_press(PaletteButton::GpsStream)?;
    walk(&mut session, 11.3500, 46.5000);
    session.press(PaletteButton::Commit)?;
    session.next_completion().await;

    walk(&mut session, 11.3504, 46.5000);
    session.press(PaletteButton::Commit)?;
    session.next_completion().await;
    ensure!(parcels.len() == 2, "expected two parcels, got {}", parcels.len());

    session.press(PaletteButton::Undo)?;
    session.press(PaletteButton::Extend)?;
    drag(
        &mut session,
        Coordinate { x: 11.3502, y: 46.5002 },
        Coordinate { x: 11.3506, y: 46.5002 },
    )?;
    session.next_completion().await;

    let pair = session
        .cut_extend_pair()
        .ok_or_else(|| anyhow!("extend found no parcels"))?;
    println!(
        "Extending {} with {}: {} part(s)",
        pair.processed().id(),
        pair.remove().id(),
        part_count(pair.preview())
    );
    session.press(PaletteButton::Commit)?;
    session.next_completion().await;
    println!("Parcels after extend: {}", parcels.len());

    session.press(PaletteButton::SelectEditable)?;
    drag(
        &mut session,
        Coordinate { x: 11.3495, y: 46.4995 },
        Coordinate { x: 11.3515, y: 46.5010 },
    )?;
    session.next_completion().await;

    session.press(PaletteButton::Delete)?;
    session.press(PaletteButton::Commit)?;
    session.next_completion().await;
    println!("Parcels after delete: {}", parcels.len());

    Ok(())
}

/// Walks around a parcel of roughly 30 by 45 meters starting at its south-west corner.
fn walk(session: &mut EditingSession, lon: f64, lat: f64) {
    const STEP: f64 = 0.0004;
    for (dx, dy) in [(0.0, 0.0), (STEP, 0.0), (STEP, STEP), (0.0, STEP)] {
        session.gps_update(lon + dx, lat + dy);
    }
}

fn drag(session: &mut EditingSession, from: Coordinate, to: Coordinate) -> Result<()> {
    let view = *session.view();
    let start = view
        .map_to_screen(from)
        .ok_or_else(|| anyhow!("{from:?} is not on the screen"))?;
    let end = view
        .map_to_screen(to)
        .ok_or_else(|| anyhow!("{to:?} is not on the screen"))?;

    session.handle_pointer(PointerEvent::Down(start));
    session.handle_pointer(PointerEvent::Move(end));
    session.handle_pointer(PointerEvent::Up(end));
    Ok(())
}
