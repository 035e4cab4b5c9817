//! SDL2 window, streaming texture and input translation

use crate::palette::Rgb;
use crate::pixel_buffer::PixelBuffer;

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Mouse events SDL synthesizes from touches carry this id
const TOUCH_MOUSE_ID: u32 = u32::MAX;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture sized to the heat grid; stretched over the window on present
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    /// Pointer moved, in window pixels
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    PointerUp,
    /// Pointer left the window
    PointerLeave,
    Resized { width: u32, height: u32 },
}

impl Display {
    /// Create a resizable window
    /// vsync=true: one frame per monitor refresh
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        // Smooth the upscaled grid instead of showing hard cell edges
        sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", "1");

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        log::info!("Window {}x{} created (vsync {})", width, height, vsync);

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    /// Upload the frame and draw it scaled by `scale`, over a background fill
    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        buffer: &PixelBuffer,
        scale: u32,
        background: Rgb,
    ) -> Result<(), String> {
        target
            .texture
            .update(None, buffer.as_bytes(), buffer.pitch())
            .map_err(|e| e.to_string())?;

        self.canvas
            .set_draw_color(Color::RGB(background.r, background.g, background.b));
        self.canvas.clear();
        let dst = Rect::new(0, 0, target.width * scale, target.height * scale);
        self.canvas.copy(&target.texture, None, dst)?;
        self.canvas.present();
        Ok(())
    }

    /// Fill the window with a flat color (used when motion is disabled)
    pub fn present_background(&mut self, background: Rgb) {
        self.canvas
            .set_draw_color(Color::RGB(background.r, background.g, background.b));
        self.canvas.clear();
        self.canvas.present();
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let (w, h) = (self.width as f32, self.height as f32);

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::MouseMotion { x, y, which, .. } if which != TOUCH_MOUSE_ID => {
                    events.push(InputEvent::PointerMove {
                        x: x as f32,
                        y: y as f32,
                    });
                }
                Event::MouseButtonDown {
                    x,
                    y,
                    mouse_btn: MouseButton::Left,
                    which,
                    ..
                } if which != TOUCH_MOUSE_ID => events.push(InputEvent::PointerDown {
                    x: x as f32,
                    y: y as f32,
                }),
                Event::MouseButtonUp {
                    mouse_btn: MouseButton::Left,
                    which,
                    ..
                } if which != TOUCH_MOUSE_ID => events.push(InputEvent::PointerUp),
                // Finger coordinates are normalized to [0, 1]
                Event::FingerDown { x, y, .. } => {
                    events.push(InputEvent::PointerDown { x: x * w, y: y * h });
                }
                Event::FingerMotion { x, y, .. } => {
                    events.push(InputEvent::PointerMove { x: x * w, y: y * h });
                }
                Event::FingerUp { .. } => events.push(InputEvent::PointerUp),
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::SizeChanged(nw, nh) => {
                        self.width = nw.max(1) as u32;
                        self.height = nh.max(1) as u32;
                        events.push(InputEvent::Resized {
                            width: self.width,
                            height: self.height,
                        });
                    }
                    WindowEvent::Leave => events.push(InputEvent::PointerLeave),
                    _ => {}
                }
                _ => {}
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a streaming texture matching a frame buffer's size
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        // ABGR8888 is R, G, B, A in memory on little-endian hosts
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }

    pub fn matches(&self, buffer: &PixelBuffer) -> bool {
        self.width == buffer.width() && self.height == buffer.height()
    }
}
