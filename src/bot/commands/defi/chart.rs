use std::io::Cursor;

use chrono::{DateTime, Utc};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::{api::coingecko::{HistoricalMarketData, MarketApi}, bot::{commands::commands::BotResult, response::response::Attachment}};

pub const CHART_WIDTH: u32 = 970;
pub const CHART_HEIGHT: u32 = 650;
pub const CHART_FILENAME: &str = "chart.png";

const LINE_WIDTH: f32 = 6.0;
/// The gradient runs from the top of the canvas down to this row, then holds.
const GRADIENT_HEIGHT: f32 = 400.0;
const MARGIN_LEFT: u32 = 170;
const MARGIN_RIGHT: u32 = 60;
const MARGIN_TOP: u32 = 70;
const MARGIN_BOTTOM: u32 = 60;
const LEGEND_TOP: u32 = 24;
const TICK_GAP: i64 = 12;
const GLYPH_SIZE: u32 = 8;
const TEXT_SCALE: u32 = 2;
const MAX_TICK_DECIMALS: usize = 8;
const DAY_MILLIS: i64 = 86_400_000;
const GRID_ROWS: u32 = 5;
const GRID_COLUMNS: u32 = 6;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID: Rgba<u8> = Rgba([224, 224, 224, 255]);
const AXIS: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT: Rgba<u8> = Rgba([64, 64, 64, 255]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColorConfig {
    pub border_color: u32,
    pub gradient_from: Rgba<u8>,
    pub gradient_to: Rgba<u8>,
}

impl ChartColorConfig {
    const fn new(border_color: u32, from: [u8; 4], to: [u8; 4]) -> Self {
        ChartColorConfig { border_color, gradient_from: Rgba(from), gradient_to: Rgba(to) }
    }

    pub fn border_rgba(&self) -> Rgba<u8> {
        let [_, r, g, b] = self.border_color.to_be_bytes();
        Rgba([r, g, b, 255])
    }
}

const BITCOIN: ChartColorConfig = ChartColorConfig::new(0xffa301, [159, 110, 43, 230], [76, 66, 52, 128]);
const ETHEREUM: ChartColorConfig = ChartColorConfig::new(0xff0421, [173, 36, 43, 230], [77, 48, 53, 128]);
const TETHER: ChartColorConfig = ChartColorConfig::new(0x22a07a, [46, 78, 71, 230], [48, 63, 63, 128]);
const BINANCE_TERRA: ChartColorConfig = ChartColorConfig::new(0xf5bc00, [172, 136, 41, 230], [73, 67, 55, 128]);
const SOLANA: ChartColorConfig = ChartColorConfig::new(0x9945ff, [116, 62, 184, 230], [61, 53, 83, 128]);
const DEFAULT: ChartColorConfig = ChartColorConfig::new(0x009cdb, [53, 83, 192, 230], [58, 69, 110, 128]);

pub fn get_chart_color_config(id: &str) -> ChartColorConfig {
    match id {
        "bitcoin" => BITCOIN,
        "ethereum" => ETHEREUM,
        "tether" => TETHER,
        "binancecoin" | "terra" => BINANCE_TERRA,
        "solana" => SOLANA,
        _ => DEFAULT,
    }
}

#[derive(Debug, Clone)]
pub struct HistoricalChart {
    pub attachment: Attachment,
    pub data: HistoricalMarketData,
}

/// Fetches `days` of history for `id` and renders it as a filled line chart.
pub async fn render_historical_market_chart(market: &dyn MarketApi, id: &str, currency: &str, days: u32) -> BotResult<HistoricalChart> {
    let data = market.get_historical_market_data(id, currency, days).await?;
    let png = draw_line_chart(&data, currency, get_chart_color_config(id))?;

    Ok(HistoricalChart {
        attachment: Attachment { filename: CHART_FILENAME.to_string(), data: png },
        data,
    })
}

/// Draws the series as a filled line chart with price ticks, date ticks and a
/// `Price (<CUR>), <from> - <to>` legend, and encodes it as PNG.
pub fn draw_line_chart(data: &HistoricalMarketData, currency: &str, colors: ChartColorConfig) -> BotResult<Vec<u8>> {
    let mut img = RgbaImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);
    let plot = PlotArea::new();

    draw_grid(&mut img, &plot);
    draw_legend(&mut img, &plot, data, currency, &colors);

    if let Some(series) = Series::new(data) {
        draw_price_ticks(&mut img, &plot, &series);
        draw_date_ticks(&mut img, &plot, &series);

        let points = plot.project(&series);
        if points.len() > 1 {
            fill_under(&mut img, &plot, &points, &colors);
            for pair in points.windows(2) {
                draw_thick_segment(&mut img, pair[0], pair[1], LINE_WIDTH, colors.border_rgba());
            }
        }
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Finite points of a history with their price range. A flat series gets a
/// small band around its value so it sits mid-chart.
struct Series {
    timestamps: Vec<i64>,
    prices: Vec<f64>,
    min: f64,
    max: f64,
}

impl Series {
    fn new(data: &HistoricalMarketData) -> Option<Self> {
        let (timestamps, prices): (Vec<i64>, Vec<f64>) = data
            .timestamps
            .iter()
            .copied()
            .zip(data.prices.iter().copied())
            .filter(|(_, price)| price.is_finite())
            .unzip();

        if prices.is_empty() {
            return None;
        }

        let mut min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
            min -= pad;
            max += pad;
        }

        Some(Series { timestamps, prices, min, max })
    }
}

struct PlotArea {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl PlotArea {
    fn new() -> Self {
        PlotArea {
            left: MARGIN_LEFT as f32,
            right: (CHART_WIDTH - MARGIN_RIGHT) as f32,
            top: MARGIN_TOP as f32,
            bottom: (CHART_HEIGHT - MARGIN_BOTTOM) as f32,
        }
    }

    fn row_y(&self, row: u32) -> f32 {
        self.top + (self.bottom - self.top) * row as f32 / GRID_ROWS as f32
    }

    fn column_x(&self, column: u32) -> f32 {
        self.left + (self.right - self.left) * column as f32 / GRID_COLUMNS as f32
    }

    /// Points are spread evenly by index across the width.
    fn point_x(&self, index: usize, count: usize) -> f32 {
        if count > 1 {
            self.left + (self.right - self.left) * index as f32 / (count - 1) as f32
        } else {
            self.left
        }
    }

    /// Maps prices to pixel coordinates, min price at the bottom edge and max at the top.
    fn project(&self, series: &Series) -> Vec<(f32, f32)> {
        let span = series.max - series.min;
        let count = series.prices.len();

        series
            .prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let ratio = ((price - series.min) / span) as f32;
                (self.point_x(i, count), self.bottom - ratio * (self.bottom - self.top))
            })
            .collect()
    }
}

fn draw_grid(img: &mut RgbaImage, plot: &PlotArea) {
    for row in 0..=GRID_ROWS {
        let y = plot.row_y(row);
        for x in plot.left as u32..=plot.right as u32 {
            put(img, x as i64, y as i64, GRID);
        }
    }
    for column in 0..=GRID_COLUMNS {
        let x = plot.column_x(column);
        for y in plot.top as u32..=plot.bottom as u32 {
            put(img, x as i64, y as i64, GRID);
        }
    }

    // axes
    for x in plot.left as u32..=plot.right as u32 {
        put(img, x as i64, plot.bottom as i64, AXIS);
    }
    for y in plot.top as u32..=plot.bottom as u32 {
        put(img, plot.left as i64, y as i64, AXIS);
    }
}

fn draw_legend(img: &mut RgbaImage, plot: &PlotArea, data: &HistoricalMarketData, currency: &str, colors: &ChartColorConfig) {
    let mut label = format!("Price ({})", currency.to_uppercase());
    if !data.from.is_empty() {
        label.push_str(&format!(", {} - {}", data.from, data.to));
    }

    let y = LEGEND_TOP as i64;
    let swatch = text_height() as i64;
    for dy in 0..swatch {
        for dx in 0..swatch {
            put(img, plot.left as i64 + dx, y + dy, colors.border_rgba());
        }
    }
    draw_text(img, plot.left as i64 + swatch + 8, y, &label, TEXT);
}

/// One label per horizontal grid line, right-aligned against the y axis.
fn draw_price_ticks(img: &mut RgbaImage, plot: &PlotArea, series: &Series) {
    for row in 0..=GRID_ROWS {
        let value = series.max - (series.max - series.min) * row as f64 / GRID_ROWS as f64;
        let label = format_price_tick(value);
        let x = plot.left as i64 - TICK_GAP - text_width(&label) as i64;
        let y = plot.row_y(row) as i64 - text_height() as i64 / 2;
        draw_text(img, x, y, &label, TEXT);
    }
}

/// Labels under the points nearest to each vertical grid line. Intraday
/// series show the time of day instead of the date.
fn draw_date_ticks(img: &mut RgbaImage, plot: &PlotArea, series: &Series) {
    let count = series.timestamps.len();
    let (Some(first), Some(last)) = (series.timestamps.first(), series.timestamps.last()) else {
        return;
    };
    let format = if last - first <= 2 * DAY_MILLIS { "%H:%M" } else { "%b %-d" };

    let columns = if count > 1 { GRID_COLUMNS } else { 0 };
    for column in 0..=columns {
        let index = ((count - 1) as f32 * column as f32 / GRID_COLUMNS as f32).round() as usize;
        let Some(label) = DateTime::<Utc>::from_timestamp_millis(series.timestamps[index]).map(|d| d.format(format).to_string()) else {
            continue;
        };
        let x = plot.point_x(index, count) as i64 - text_width(&label) as i64 / 2;
        draw_text(img, x, plot.bottom as i64 + TICK_GAP, &label, TEXT);
    }
}

/// Three significant digits below 1, cents up to 1000, whole units above.
pub fn format_price_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1000.0 {
        format!("{value:.0}")
    } else if magnitude >= 1.0 {
        format!("{value:.2}")
    } else if magnitude == 0.0 {
        "0".to_string()
    } else {
        let digits = ((-magnitude.log10()).floor() as usize + 3).min(MAX_TICK_DECIMALS);
        format!("{value:.digits$}")
    }
}

fn text_width(text: &str) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * TEXT_SCALE
}

fn text_height() -> u32 {
    GLYPH_SIZE * TEXT_SCALE
}

/// Blits `text` with the 8x8 bitmap font, each glyph pixel scaled to a square.
/// Characters outside the basic set leave a blank cell.
fn draw_text(img: &mut RgbaImage, x: i64, y: i64, text: &str, color: Rgba<u8>) {
    let scale = TEXT_SCALE as i64;
    let mut cx = x;

    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1u8 << col) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            put(img, cx + col as i64 * scale + dx, y + row as i64 * scale + dy, color);
                        }
                    }
                }
            }
        }
        cx += (GLYPH_SIZE * TEXT_SCALE) as i64;
    }
}

/// Every column under the polyline is blended exactly once: a segment owns
/// `[start, end)` and only the last one also owns its end column.
fn fill_under(img: &mut RgbaImage, plot: &PlotArea, points: &[(f32, f32)], colors: &ChartColorConfig) {
    let last_segment = points.len().saturating_sub(2);

    for (i, pair) in points.windows(2).enumerate() {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let start = x0.round() as i64;
        let end = x1.round() as i64;
        let stop = if i == last_segment { end + 1 } else { end };

        for x in start..stop {
            let t = if end > start { (x - start) as f32 / (end - start) as f32 } else { 0.0 };
            let line_y = y0 + (y1 - y0) * t;
            for y in line_y.round() as i64..=plot.bottom as i64 {
                blend(img, x, y, gradient_at(colors, y as f32));
            }
        }
    }
}

fn gradient_at(colors: &ChartColorConfig, y: f32) -> Rgba<u8> {
    let t = (y / GRADIENT_HEIGHT).clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    let (from, to) = (colors.gradient_from.0, colors.gradient_to.0);
    Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), mix(from[3], to[3])])
}

fn draw_thick_segment(img: &mut RgbaImage, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba<u8>) {
    let radius = width / 2.0;
    let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
    let steps = length.ceil().max(1.0) as u32;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let cx = from.0 + (to.0 - from.0) * t;
        let cy = from.1 + (to.1 - from.1) * t;
        stamp_disc(img, cx, cy, radius, color);
    }
}

fn stamp_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let r = radius.ceil() as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= radius * radius {
                put(img, cx.round() as i64 + dx, cy.round() as i64 + dy, color);
            }
        }
    }
}

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return;
    }
    let base = img.get_pixel(x as u32, y as u32).0;
    let alpha = color.0[3] as f32 / 255.0;
    let mix = |b: u8, c: u8| (b as f32 * (1.0 - alpha) + c as f32 * alpha).round() as u8;
    img.put_pixel(x as u32, y as u32, Rgba([mix(base[0], color.0[0]), mix(base[1], color.0[1]), mix(base[2], color.0[2]), 255]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::FakeMarket;

    #[test]
    fn binancecoin_and_terra_share_colours() {
        assert_eq!(get_chart_color_config("binancecoin"), get_chart_color_config("terra"));
        assert_eq!(get_chart_color_config("terra").border_color, 0xf5bc00);
    }

    #[test]
    fn unknown_ids_use_default_colours() {
        assert_eq!(get_chart_color_config("fantom").border_color, 0x009cdb);
        assert_eq!(get_chart_color_config("bitcoin").border_color, 0xffa301);
        assert_eq!(get_chart_color_config("bitcoin").gradient_from, Rgba([159, 110, 43, 230]));
    }

    fn daily(prices: &[f64]) -> HistoricalMarketData {
        let points: Vec<(i64, f64)> = prices.iter().enumerate().map(|(i, p)| (i as i64 * DAY_MILLIS, *p)).collect();
        HistoricalMarketData::from_points(&points)
    }

    fn render(data: &HistoricalMarketData) -> RgbaImage {
        let png = draw_line_chart(data, "usd", DEFAULT).unwrap();
        image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap().to_rgba8()
    }

    fn count_text_pixels(img: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|(x, y)| *img.get_pixel(*x, *y) == TEXT)
            .count()
    }

    #[test]
    fn renders_png_of_fixed_size() {
        let png = draw_line_chart(&daily(&[1.0, 3.0, 2.0, 5.0]), "usd", get_chart_color_config("solana")).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (CHART_WIDTH, CHART_HEIGHT));
    }

    #[test]
    fn flat_and_empty_series_still_render() {
        assert!(draw_line_chart(&daily(&[]), "usd", DEFAULT).is_ok());
        assert!(draw_line_chart(&daily(&[2.0]), "usd", DEFAULT).is_ok());
        assert!(draw_line_chart(&daily(&[2.0, 2.0, 2.0]), "usd", DEFAULT).is_ok());
        assert!(draw_line_chart(&daily(&[0.0, 0.0]), "usd", DEFAULT).is_ok());
    }

    #[test]
    fn projection_spans_plot_area() {
        let plot = PlotArea::new();
        let series = Series::new(&daily(&[10.0, 20.0])).unwrap();
        let points = plot.project(&series);
        assert_eq!(points[0], (plot.left, plot.bottom));
        assert_eq!(points[1], (plot.right, plot.top));
    }

    #[test]
    fn flat_series_sits_mid_chart() {
        let plot = PlotArea::new();
        let series = Series::new(&daily(&[4.0, 4.0, 4.0])).unwrap();
        assert!(series.max > series.min);
        let (_, y) = plot.project(&series)[1];
        assert!((y - (plot.top + plot.bottom) / 2.0).abs() < 1.0);
    }

    #[test]
    fn fill_is_even_across_shared_point_columns() {
        let img = render(&daily(&[2.0; 25]));
        let plot = PlotArea::new();
        let y = plot.bottom as u32 - 10;
        let grid: Vec<u32> = (0..=GRID_COLUMNS).map(|c| plot.column_x(c) as u32).collect();

        let expected = *img.get_pixel(plot.left as u32 + 3, y);
        assert_ne!(expected, BACKGROUND);
        for x in plot.left as u32 + 1..plot.right as u32 {
            if grid.contains(&x) {
                continue;
            }
            assert_eq!(*img.get_pixel(x, y), expected, "column {x}");
        }
    }

    #[test]
    fn draws_legend_and_axis_labels() {
        let img = render(&daily(&[0.4, 0.45, 0.5, 0.42]));
        let plot = PlotArea::new();

        let legend = count_text_pixels(&img, plot.left as u32..CHART_WIDTH, LEGEND_TOP..LEGEND_TOP + text_height());
        let prices = count_text_pixels(&img, 0..plot.left as u32, plot.top as u32..plot.bottom as u32);
        let dates = count_text_pixels(&img, plot.left as u32 - 60..CHART_WIDTH, plot.bottom as u32 + 1..CHART_HEIGHT);
        assert!(legend > 0);
        assert!(prices > 0);
        assert!(dates > 0);
    }

    #[test]
    fn price_ticks_keep_significant_digits() {
        assert_eq!(format_price_tick(42_123.4), "42123");
        assert_eq!(format_price_tick(1.2345), "1.23");
        assert_eq!(format_price_tick(0.45), "0.450");
        assert_eq!(format_price_tick(0.0000123), "0.0000123");
        assert_eq!(format_price_tick(0.0), "0");
    }

    #[test]
    fn text_width_follows_glyph_cells() {
        assert_eq!(text_width("Apr 15"), 6 * GLYPH_SIZE * TEXT_SCALE);
        assert_eq!(text_width(""), 0);
    }

    #[tokio::test]
    async fn renders_from_market_history() {
        let market = FakeMarket::default();
        let chart = render_historical_market_chart(&market, "fantom", "usd", 30).await.unwrap();

        assert_eq!(chart.attachment.filename, "chart.png");
        assert_eq!(chart.data.prices.len(), 31);
        assert_eq!(market.history_calls.lock().await.as_slice(), &[("fantom".to_string(), "usd".to_string(), 30)]);
    }
}
