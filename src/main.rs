// main.rs      gifimage command
//
// Copyright (c) 2019-2025  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifimage::{ColorTable, Frame, FrameRaster, GifImage};
use pix::rgb::{Rgb, SRgba8};
use std::error::Error;
use std::ffi::OsStr;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifimage")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF image utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF frame table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            show_file(out, path)?;
        }
    }
    Ok(())
}

/// Table column widths
struct Columns {
    frame: usize,
    size: usize,
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    out.set_color(&magenta)?;
    writeln!(out, "{:?}", path)?;
    let image = match GifImage::open(path) {
        Ok(image) => image,
        Err(e) => {
            out.set_color(&red)?;
            writeln!(out, "{} ({:?})", e, e.kind())?;
            return Ok(());
        }
    };
    let (width, height) = image.canvas_size().unwrap_or_default();
    let cols = Columns {
        frame: digits(image.frame_count() as u64).max(3),
        size: 4.max(1 + digits(width) + digits(height)),
    };
    out.set_color(&bold)?;
    write!(out, "canvas: {}x{}, frames: {}", width, height, image.frame_count())?;
    if let Some(clr) = image.background_color() {
        write!(out, ", background: {}", hex(clr))?;
    }
    writeln!(out)?;
    out.set_color(&yellow)?;
    write!(out, " {:>w$}", "Fr#", w = cols.frame)?;
    write!(out, "  Delay")?;
    write!(out, " {:>w$}", "Size", w = cols.size)?;
    write!(out, " {:>w$}", "X,Y", w = cols.size)?;
    writeln!(out, " Clrs Transparent")?;
    for (n, frame) in image.frames().iter().enumerate() {
        show_frame(out, &image, frame, n, &cols)?;
    }
    Ok(())
}

/// Show one frame of a GIF file
fn show_frame(
    out: &mut StandardStream,
    image: &GifImage,
    frame: &Frame,
    number: usize,
    cols: &Columns,
) -> Result<(), Box<dyn Error>> {
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    out.set_color(&dflt)?;
    let interlaced = if frame.interlaced() { 'i' } else { ' ' };
    write!(out, "{}", interlaced)?;
    out.set_color(&bold)?;
    write!(out, "{:>w$}", number, w = cols.frame)?;
    match frame.delay_time_cs() {
        Some(d) => {
            if d == 0 {
                out.set_color(&dflt)?;
            }
            write!(out, " {:6.2}", f32::from(d) / 100.0)?;
        }
        None => {
            out.set_color(&dflt)?;
            write!(out, " {:>6}", "-")?;
        }
    }
    let (width, height) = image.canvas_size().unwrap_or_default();
    if width == frame.width() && height == frame.height() {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{}x{}", frame.width(), frame.height()),
        w = cols.size
    )?;
    if frame.left() == 0 && frame.top() == 0 {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{},{}", frame.left(), frame.top()),
        w = cols.size
    )?;
    let global = image.global_color_table();
    match (frame.color_table(), global) {
        (Some(tbl), Some(g)) if tbl.same_colors(g) => {
            out.set_color(&dflt)?;
            write!(out, " {:3}g", g.len())?;
        }
        (Some(tbl), _) => {
            out.set_color(&bold)?;
            write!(out, "  {:3}", tbl.len())?;
        }
        (None, _) => {
            out.set_color(&dflt)?;
            let len = global.map_or(0, ColorTable::len);
            let kind = match frame.raster() {
                FrameRaster::Indexed(_) => 'g',
                FrameRaster::TrueColor(_) => 't',
            };
            write!(out, " {:3}{}", len, kind)?;
        }
    }
    match frame.transparent_color() {
        Some(clr) => {
            out.set_color(&bold)?;
            writeln!(out, " {}", hex(clr))?;
        }
        None => {
            out.set_color(&dflt)?;
            writeln!(out, " -")?;
        }
    }
    Ok(())
}

/// Format a color as hex RGB
fn hex(clr: SRgba8) -> String {
    format!(
        "#{:02X}{:02X}{:02X}",
        u8::from(Rgb::red(clr)),
        u8::from(Rgb::green(clr)),
        u8::from(Rgb::blue(clr)),
    )
}

/// Calculate digits in a number
fn digits<T: Into<u64>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
