// main.rs      giflet command
//
// Copyright (c) 2026  giflet developers
//
#![forbid(unsafe_code)]

use giflet::{decode, is_gif, Animation, DisposalMethod};
use std::env;
use std::error::Error;
use std::fs;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    if let Some(cmd) = env::args().nth(0) {
        if let Some(path) = env::args().nth(1) {
            show(&mut out, path)?;
        } else {
            out.set_color(&red)?;
            writeln!(out, "usage: {} [filename]", cmd)?;
        }
    } else {
        out.set_color(&red)?;
        writeln!(out, "environment failure!")?;
    }
    out.reset()?;
    Ok(())
}

fn show(out: &mut StandardStream, path: String) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let gif = fs::read(&path)?;
    if !is_gif(&gif) {
        out.set_color(&red)?;
        writeln!(out, "not a GIF: {}", path)?;
        return Ok(());
    }
    let anim = match decode(&gif) {
        Ok(anim) => anim,
        Err(e) => {
            out.set_color(&red)?;
            writeln!(out, "decode failed: {}", e)?;
            return Ok(());
        }
    };
    out.set_color(&magenta)?;
    writeln!(out, "{}", path)?;
    write_summary(out, &anim)?;
    out.set_color(&yellow)?;
    writeln!(out, " Fr#  Delay Disp Bytes")?;
    for (n, f) in anim.frames().iter().enumerate() {
        let mut dflt = ColorSpec::new();
        dflt.set_fg(Some(Color::White));
        let mut bold = ColorSpec::new();
        bold.set_fg(Some(Color::White)).set_intense(true).set_bold(true);
        let d = match f.disposal() {
            DisposalMethod::NoAction => "none",
            DisposalMethod::Keep => "keep",
            DisposalMethod::Background => "bg",
            DisposalMethod::Previous => "prev",
            DisposalMethod::Reserved(_) => "res",
        };
        out.set_color(if f.delay_ms() > 0 { &bold } else { &dflt })?;
        write!(out, "{:>4} {:6.2}", n, f.delay_ms() as f32 / 1000.0)?;
        out.set_color(match d {
            "none" => &dflt,
            "res" => &red,
            _ => &bold,
        })?;
        write!(out, " {:>4}", d)?;
        out.set_color(&dflt)?;
        writeln!(out, " {:>5}", f.image().len())?;
    }
    Ok(())
}

fn write_summary(
    out: &mut StandardStream,
    anim: &Animation,
) -> Result<(), Box<dyn Error>> {
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White)).set_intense(true).set_bold(true);
    out.set_color(&bold)?;
    write!(
        out,
        "{}x{}, frames: {}, repeat: ",
        anim.screen_width(),
        anim.screen_height(),
        anim.frames().len()
    )?;
    if anim.infinite() {
        writeln!(out, "∞")?;
    } else {
        writeln!(out, "{}", anim.loop_count())?;
    }
    Ok(())
}
