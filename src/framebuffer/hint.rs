//! Instructions shown when the frame has never received an image

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X13};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};

use crate::framebuffer::color::TriColor;

/// Draw the connection instructions centred on `target`
pub fn draw_upload_hint<D>(target: &mut D, ssid: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = TriColor>,
{
    let centre = target.bounding_box().center();

    let title = MonoTextStyle::new(&FONT_10X20, TriColor::Red);
    let body = MonoTextStyle::new(&FONT_6X13, TriColor::Black);

    Text::with_alignment("No image yet", centre - Point::new(0, 24), title, Alignment::Center)
        .draw(target)?;

    let join = format!("Join the Wi-Fi network \"{}\"", ssid);
    Text::with_alignment(&join, centre + Point::new(0, 8), body, Alignment::Center).draw(target)?;

    Text::with_alignment(
        "and open any web page to upload a picture",
        centre + Point::new(0, 26),
        body,
        Alignment::Center,
    )
    .draw(target)?;

    Ok(())
}
