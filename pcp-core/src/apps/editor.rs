//! RGB editor
//!
//! Three encoders edit the red, green and blue fields of one palette color.
//! The palette index arrives as the frame data of the push that opened the
//! editor. A tick moves a field by 0x11, or by 1 while that encoder's push
//! switch is held. All three LEDs show the color being edited.
//!
//! ```text
//! ┌──────────────────────┐
//! │ C#/Db                │
//! │ #cc1100              │  large
//! └──────────────────────┘
//! ```

use alloc::boxed::Box;
use core::fmt::Write;

use pcp_hal::{Font, Point};

use super::palette::Palette;
use crate::config::{Controls, PALETTE_SIZE};
use crate::context::{Context, ContextBuilder, Ctx, EncoderTriplet, Payload, BACK_GLYPH};
use crate::leds::LedRefs;

/// Build the editor context
pub fn build(palette: &'static Palette, controls: &Controls) -> Context {
    let triplet = EncoderTriplet::new([0, 1, 2].map(|i| (controls.encoders[i], controls.switches[i])));

    let mut b = ContextBuilder::begin("rgb editor");
    for i in 0..3 {
        let switch = controls.switches[i];
        b.set_encoder(
            controls.encoders[i],
            Some(switch),
            Some(Box::new(move |ctx: &mut Ctx<'_>, direction| {
                let fine = ctx.is_held(switch);
                ctx.encoders_mut().step(i, direction, fine);
            })),
            None,
            &controls.labels[i],
        );
    }

    b.set_button(
        controls.upper,
        Box::new(|ctx: &mut Ctx<'_>, pressed| {
            if pressed {
                ctx.pop();
            }
        }),
        Some(BACK_GLYPH),
    );

    b.set_on_enable(Box::new(move |ctx: &mut Ctx<'_>| {
        let note = match ctx.frame_data() {
            Some(data) if (data.0 as usize) < PALETTE_SIZE => data.0 as usize,
            other => panic!("rgb editor opened with frame data {:?}", other),
        };
        let cell = palette.cell(note);
        ctx.encoders_mut().attach(cell);

        let mut leds = LedRefs::dark();
        leds.fill(cell);
        ctx.set_leds(leds);
    }));

    b.set_render(|r| {
        if let Some(data) = r.frame {
            r.surface
                .draw_string(Point::new(0, 2), Font::Medium, Palette::name(data.0 as usize));
        }

        let mut hex: heapless::String<8> = heapless::String::new();
        let _ = write!(hex, "#{:06x}", r.payload.encoders().packed());
        r.surface.draw_string(Point::new(0, 18), Font::Large, &hex);
    });

    b.set_payload(Payload::Encoders(triplet));
    b.finalize()
}
