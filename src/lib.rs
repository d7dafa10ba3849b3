//! Tilesmith - Library for analysing and exporting 8x8 tile art
//!
//! This library provides functionality to:
//! - Cut images into fixed-size tiles and find duplicates, including flips
//! - Quantize images to small fixed palettes and extract sprite colors
//! - Export sprite sheets as animation resources for a retro game editor
//! - Run named transforms over single images or whole folders

pub mod batch;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod config;
pub mod dedup;
pub mod export;
pub mod font;
pub mod logging;
pub mod output;
pub mod palette;
pub mod params;
pub mod tile;
pub mod transforms;
