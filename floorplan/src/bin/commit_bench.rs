use floorplan::{CuttingLine, Point, Scene};
use std::time::Instant;

// Lays down `rows` horizontal walls, then commits `cols` vertical walls across them
// so every commit runs the crossing pass against a growing scene.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut rows = 40usize;
    let mut cols = 40usize;
    let mut slices = 20usize;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--rows=") { if let Ok(v)=val.parse() { rows=v; } }
        else if let Some(val)=a.strip_prefix("--cols=") { if let Ok(v)=val.parse() { cols=v; } }
        else if let Some(val)=a.strip_prefix("--slices=") { if let Ok(v)=val.parse() { slices=v; } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let span = 400.0 * (rows.max(cols) as f64 + 1.0);
    let mut scene = Scene::new();
    for j in 0..rows {
        let y = 400.0 * (j as f64 + 1.0);
        scene.commit_polyline(&[Point::new(0.0, y), Point::new(span, y)]);
    }

    let mut times_ms: Vec<f64> = Vec::with_capacity(cols);
    let mut crossings = 0usize;
    let start_all = Instant::now();
    for i in 0..cols {
        let x = 400.0 * (i as f64 + 1.0) + 13.0;
        let t0 = Instant::now();
        if let Some(r) = scene.commit_polyline(&[Point::new(x, -50.0), Point::new(x, span + 50.0)]) { crossings += r.crossings; }
        times_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
    }
    let mut cut_walls = 0usize;
    for k in 0..slices {
        let y = 400.0 * (k as f64 + 1.0) + 200.0;
        let r = scene.slice_at(CuttingLine::new(Point::new(-10.0, y), Point::new(span + 10.0, y)));
        cut_walls += r.updated_walls.len();
    }
    let dur_all = start_all.elapsed().as_secs_f64() * 1000.0;
    times_ms.sort_by(|a,b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    let p99 = percentile(&times_ms, 0.99);
    println!("rows={} cols={} walls={} crossings={} cut_walls={} total_ms={:.3} median_ms={:.4} p90_ms={:.4} p99_ms={:.4}", rows, cols, scene.wall_count(), crossings, cut_walls, dur_all, med, p90, p99);
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
