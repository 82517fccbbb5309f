//! Static, shareable PNG summary of a wrap.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

use super::font::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::models::{ArtistRecord, TrackRecord, WrapSnapshot};

pub const CARD_WIDTH: u32 = 720;
pub const CARD_HEIGHT: u32 = 960;

const MARGIN: u32 = 40;
const HEADER_HEIGHT: u32 = 120;
const SECTION_ITEMS: usize = 5;
const FUN_FACT_LINES: usize = 3;

const BACKGROUND: Rgba<u8> = Rgba([18, 18, 18, 255]);
const ACCENT: Rgba<u8> = Rgba([29, 185, 84, 255]);
const TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MUTED: Rgba<u8> = Rgba([179, 179, 179, 255]);

#[derive(Debug, Error)]
pub enum CardError {
    #[error("Failed to encode card: {0}")]
    Encoding(#[from] image::ImageError),
}

pub fn card_filename(wrap_id: usize) -> String {
    format!("wrap_{}.png", wrap_id)
}

/// Draws the card for `snapshot` and returns it PNG encoded.
pub fn render_card(snapshot: &WrapSnapshot, username: &str) -> Result<Vec<u8>, CardError> {
    let mut canvas = RgbaImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);
    fill_rect(&mut canvas, 0, 0, CARD_WIDTH, HEADER_HEIGHT, ACCENT);
    draw_text(&mut canvas, MARGIN, 39, "YOUR WRAPPED", 6, BACKGROUND);

    let mut cursor = TextCursor::new(HEADER_HEIGHT + 20);
    cursor.line(&mut canvas, username, 3, TEXT);
    cursor.line(
        &mut canvas,
        &format!(
            "{} - {} TERM",
            snapshot.created_at.format("%Y-%m-%d"),
            snapshot.time_range
        ),
        2,
        MUTED,
    );
    cursor.gap(12);

    let tracks: Vec<String> = snapshot
        .top_tracks
        .iter()
        .take(SECTION_ITEMS)
        .map(|t| format!("{} - {}", t.name, t.primary_artist_name))
        .collect();
    cursor.section(&mut canvas, "TOP TRACKS", &tracks);

    let artists: Vec<String> = snapshot
        .top_artists
        .iter()
        .take(SECTION_ITEMS)
        .map(|a| a.name.clone())
        .collect();
    cursor.section(&mut canvas, "TOP ARTISTS", &artists);

    let genres: Vec<String> = snapshot
        .top_genres
        .iter()
        .take(SECTION_ITEMS)
        .map(|g| format!("{} {}%", g.genre, g.percentage))
        .collect();
    cursor.section(&mut canvas, "TOP GENRES", &genres);

    cursor.section(&mut canvas, "PICKS", &pick_lines(snapshot));

    if !snapshot.fun_fact.is_empty() {
        let lines = wrap_words(&snapshot.fun_fact, max_chars(MARGIN, 2), FUN_FACT_LINES);
        cursor.section(&mut canvas, "FUN FACT", &lines);
    }

    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Most and least popular track and artist, absent ones skipped.
fn pick_lines(snapshot: &WrapSnapshot) -> Vec<String> {
    let track_name = |track: &TrackRecord| track.name.clone();
    let artist_name = |artist: &ArtistRecord| artist.name.clone();
    [
        ("MOST POPULAR TRACK", snapshot.most_popular_track.as_ref().map(track_name)),
        ("MOST POPULAR ARTIST", snapshot.most_popular_artist.as_ref().map(artist_name)),
        ("HIDDEN GEM TRACK", snapshot.least_popular_track.as_ref().map(track_name)),
        ("HIDDEN GEM ARTIST", snapshot.least_popular_artist.as_ref().map(artist_name)),
    ]
    .into_iter()
    .filter_map(|(label, name)| name.map(|name| format!("{}: {}", label, name)))
    .collect()
}

/// Top-down layout helper advancing a vertical position.
struct TextCursor {
    y: u32,
}

impl TextCursor {
    fn new(y: u32) -> Self {
        TextCursor { y }
    }

    fn line(&mut self, canvas: &mut RgbaImage, text: &str, scale: u32, color: Rgba<u8>) {
        draw_text(canvas, MARGIN, self.y, text, scale, color);
        self.y += GLYPH_HEIGHT * scale + 3 * scale;
    }

    fn gap(&mut self, pixels: u32) {
        self.y += pixels;
    }

    fn section(&mut self, canvas: &mut RgbaImage, heading: &str, items: &[String]) {
        self.line(canvas, heading, 3, ACCENT);
        if items.is_empty() {
            self.line(canvas, "-", 2, MUTED);
        }
        for item in items {
            self.line(canvas, item, 2, TEXT);
        }
        self.gap(14);
    }
}

fn max_chars(x: u32, scale: u32) -> usize {
    (CARD_WIDTH.saturating_sub(x + MARGIN) / (GLYPH_ADVANCE * scale)) as usize
}

/// Fits `text` into at most `max_lines` lines of `width` characters,
/// truncating whatever is left.
fn wrap_words(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.truncate(max_lines);
    lines
}

/// Draws a single line, cutting it at the right margin.
fn draw_text(canvas: &mut RgbaImage, x: u32, y: u32, text: &str, scale: u32, color: Rgba<u8>) {
    for (index, c) in text.chars().take(max_chars(x, scale)).enumerate() {
        let origin_x = x + index as u32 * GLYPH_ADVANCE * scale;
        for (row, bits) in font::glyph(c).iter().enumerate() {
            for column in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - column)) != 0 {
                    fill_rect(
                        canvas,
                        origin_x + column * scale,
                        y + row as u32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x_end = (x + width).min(canvas.width());
    let y_end = (y + height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}
