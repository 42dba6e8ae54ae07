//! Bloch-sphere figure of a trajectory, colored by purity.
//!
//! The sphere is drawn in a 3D `plotters` chart whose vertical axis carries
//! the Bloch `z` component; a vertical color bar sits to its right. The figure
//! is drawn twice, over white and over black, and the two bitmaps are combined
//! into an RGBA PNG with a transparent background.

use std::{
    error::Error as StdError,
    f64::consts::{ FRAC_PI_2, PI, TAU },
    path::Path,
};
use image::{ ImageBuffer, ImageFormat, Rgba, RgbaImage };
use plotters::{
    prelude::*,
    style::text_anchor::{ HPos, Pos, VPos },
};
use tracing::debug;
use crate::{
    bloch::BlochVector,
    error::{ Error, Result },
    pipeline::{ Trajectory, purity_range },
};

type DrawResult<T> = std::result::Result<T, Box<dyn StdError>>;

/// Half-width of the plotted cube around the unit sphere.
const EXTENT: f64 = 1.3;
/// Offset along Bloch `y` of the initial-state label.
const LABEL_OFFSET_START: f64 = 0.05;
/// Offset along Bloch `y` of the final-state label.
const LABEL_OFFSET_END: f64 = -0.075;
/// Number of slices in the color bar.
const BAR_SLICES: usize = 128;

/// Matplotlib's `rainbow` color scale as fractional RGB components.
///
/// `x` is clamped to `[0, 1]`; purple at 0, red at 1.
pub fn rainbow_rgb(x: f64) -> (f64, f64, f64) {
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    let r = (2.0 * x - 0.5).abs();
    let g = (PI * x).sin();
    let b = (FRAC_PI_2 * x).cos();
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// [`rainbow_rgb`] as an 8-bit color.
pub fn rainbow(x: f64) -> RGBColor {
    let to_u8 = |c: f64| (255.0 * c).round() as u8;
    let (r, g, b) = rainbow_rgb(x);
    RGBColor(to_u8(r), to_u8(g), to_u8(b))
}

/// Map `v` linearly from `[lo, hi]` onto `[0, 1]`, clamping.
///
/// A zero-width (or inverted) range maps everything to 0.
pub fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo { ((v - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.0 }
}

// chart coordinates have y pointing up
fn chart_coords(r: BlochVector) -> (f64, f64, f64) { (r.x, r.z, -r.y) }

fn sphere_point(theta: f64, phi: f64) -> BlochVector {
    BlochVector::new(
        theta.sin() * phi.cos(),
        theta.sin() * phi.sin(),
        theta.cos(),
    )
}

/// Figure dimensions and derived sizes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self { Self { width, height } }

    fn bar_width(&self) -> u32 { (self.width / 7).max(60).min(self.width / 2) }

    fn font_size(&self) -> f64 {
        (self.width.min(self.height) as f64 / 35.0).max(10.0)
    }

    fn marker_size(&self) -> i32 {
        (self.width.min(self.height) as f64 / 160.0).round().max(2.0) as i32
    }
}

impl Default for Figure {
    fn default() -> Self { Self::new(800, 800) }
}

/// Render `traj` to an RGBA PNG with a transparent background at `path`.
///
/// Each point is colored by its purity through [`rainbow`], normalized over
/// the purity range of the whole trajectory; the first and last points are
/// labeled `ρ(0)` and `ρ(τ)`.
pub fn render<P>(traj: &Trajectory, path: P, figure: Figure) -> Result<()>
where P: AsRef<Path>
{
    let path = path.as_ref();
    debug!(path = %path.display(), ?figure, "rendering");
    draw(traj, path, figure).map_err(|e| Error::Render(e.to_string()))
}

fn draw(traj: &Trajectory, path: &Path, figure: Figure) -> DrawResult<()> {
    let on_white = draw_on(traj, figure, &WHITE)?;
    let on_black = draw_on(traj, figure, &BLACK)?;
    unblend(&on_white, &on_black, (figure.width, figure.height))
        .save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

// draw the full figure over a solid background into an RGB buffer
fn draw_on(traj: &Trajectory, figure: Figure, background: &RGBColor)
    -> DrawResult<Vec<u8>>
{
    let mut buf = vec![0_u8; 3 * figure.width as usize * figure.height as usize];
    {
        let root
            = BitMapBackend::with_buffer(&mut buf, (figure.width, figure.height))
            .into_drawing_area();
        root.fill(background)?;
        let (sphere_area, bar_area)
            = root.split_horizontally(figure.width - figure.bar_width());
        let (lo, hi)
            = purity_range(traj.purity.iter().copied()).unwrap_or((0.0, 1.0));
        draw_sphere(&sphere_area, traj, (lo, hi), figure)?;
        draw_color_bar(&bar_area, (lo, hi), figure)?;
        root.present()?;
    }
    Ok(buf)
}

/// Recover straight-alpha RGBA pixels from the same RGB image composited over
/// white and over black.
///
/// A pixel with coverage `a` and color `c` appears as `a c + (1 - a)` over
/// white and `a c` over black, so the difference gives `1 - a` and the black
/// version divided by `a` gives `c`.
fn unblend(on_white: &[u8], on_black: &[u8], (width, height): (u32, u32))
    -> RgbaImage
{
    ImageBuffer::from_fn(width, height, |x, y| {
        let k = 3 * (y as usize * width as usize + x as usize);
        let w = &on_white[k..k + 3];
        let b = &on_black[k..k + 3];
        let a: u8
            = 255 - w.iter().zip(b)
            .map(|(wj, bj)| wj.saturating_sub(*bj))
            .max()
            .unwrap_or(0);
        let straight = |bj: u8| -> u8 {
            if a == 0 { return 0; }
            ((bj as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
        };
        Rgba([straight(b[0]), straight(b[1]), straight(b[2]), a])
    })
}

fn draw_sphere<DB>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    traj: &Trajectory,
    (lo, hi): (f64, f64),
    figure: Figure,
) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart
        = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_3d(-EXTENT..EXTENT, -EXTENT..EXTENT, -EXTENT..EXTENT)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 1.0;
        pb.into_matrix()
    });

    let wire = BLACK.mix(0.15);
    let n: usize = 72;
    // meridians
    for k in 0..12 {
        let phi = TAU * k as f64 / 12.0;
        let meridian
            = (0..=n / 2)
            .map(|j| sphere_point(PI * j as f64 / (n / 2) as f64, phi))
            .map(chart_coords);
        chart.draw_series(LineSeries::new(meridian, wire))?;
    }
    // parallels
    for k in 1..6 {
        let theta = PI * k as f64 / 6.0;
        let parallel
            = (0..=n)
            .map(|j| sphere_point(theta, TAU * j as f64 / n as f64))
            .map(chart_coords);
        let style = if k == 3 { BLACK.mix(0.35) } else { wire };
        chart.draw_series(LineSeries::new(parallel, style))?;
    }
    // frame axes through the sphere
    for axis in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
        let end = BlochVector::from(axis);
        let start = BlochVector::new(-end.x, -end.y, -end.z);
        chart.draw_series(LineSeries::new(
            [start, end].into_iter().map(chart_coords),
            BLACK.mix(0.3),
        ))?;
    }

    let font = ("sans-serif", figure.font_size()).into_font();
    let centered = font.color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center));
    let labels = [
        ("x", BlochVector::new(1.2, 0.0, 0.0)),
        ("y", BlochVector::new(0.0, 1.2, 0.0)),
        ("|0>", BlochVector::new(0.0, 0.0, 1.2)),
        ("|1>", BlochVector::new(0.0, 0.0, -1.2)),
    ];
    chart.draw_series(
        labels.iter()
            .map(|(s, r)| Text::new(*s, chart_coords(*r), centered.clone()))
    )?;

    // reference vectors
    for axis in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
        chart.draw_series(LineSeries::new(
            [BlochVector::default(), BlochVector::from(axis)]
                .into_iter()
                .map(chart_coords),
            BLACK.stroke_width(3),
        ))?;
    }

    chart.draw_series(
        traj.bloch.iter().zip(&traj.purity)
            .map(|(r, p)| {
                let color = rainbow(normalize(*p, lo, hi));
                Circle::new(chart_coords(*r), figure.marker_size(), color.filled())
            })
    )?;

    let annot = font.color(&BLACK);
    if let (Some(first), Some(last)) = (traj.bloch.first(), traj.bloch.last()) {
        chart.draw_series([
            Text::new(
                "ρ(0)",
                chart_coords(first.offset(0.0, LABEL_OFFSET_START, 0.0)),
                annot.pos(Pos::new(HPos::Left, VPos::Center)),
            ),
            Text::new(
                "ρ(τ)",
                chart_coords(last.offset(0.0, LABEL_OFFSET_END, 0.0)),
                annot.pos(Pos::new(HPos::Right, VPos::Center)),
            ),
        ])?;
    }
    Ok(())
}

fn draw_color_bar<DB>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    (lo, hi): (f64, f64),
    figure: Figure,
) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // a flat purity still needs a drawable axis
    let (bar_lo, bar_hi) = if hi > lo { (lo, hi) } else { (lo - 5e-3, hi + 5e-3) };
    let label_size = figure.font_size() * 0.75;
    let mut bar
        = ChartBuilder::on(area)
        .margin_top(figure.height / 6)
        .margin_bottom(figure.height / 6)
        .margin_right(10)
        .y_label_area_size((figure.bar_width() as f64 * 0.6) as u32)
        .build_cartesian_2d(0.0..1.0, bar_lo..bar_hi)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v: &f64| format!("{:.3}", v))
        .y_desc("purity")
        .label_style(("sans-serif", label_size))
        .axis_desc_style(("sans-serif", label_size))
        .draw()?;
    let dv = (bar_hi - bar_lo) / BAR_SLICES as f64;
    bar.draw_series(
        (0..BAR_SLICES).map(|k| {
            let v0 = bar_lo + dv * k as f64;
            let color = rainbow(normalize(v0 + dv / 2.0, lo, hi));
            Rectangle::new([(0.0, v0), (1.0, v0 + dv)], color.filled())
        })
    )?;
    Ok(())
}
