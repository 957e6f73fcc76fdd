//! Line-oriented terminal presenter

use super::placeholder::{spawn_placeholder, PlaceholderHandle, DEFAULT_ELLIPSIS_INTERVAL};
use super::reveal::{spawn_reveal, RevealHandle, RevealOp, RevealSink, CARET, DEFAULT_TYPE_DELAY};
use crate::character::CharacterPanel;
use crate::runtime::Presenter;
use crate::session::{Message, RevealStyle, Role};
use async_trait::async_trait;
use crossterm::cursor::MoveLeft;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PROMPT: &str = "> ";
const PLACEHOLDER_TEXT: &str = "DungeonMind is thinking";

fn label(role: Role) -> Option<&'static str> {
    match role {
        Role::User => Some("You:"),
        Role::Assistant => Some("DungeonMind:"),
        Role::System => None,
    }
}

/// Output plus what currently occupies the bottom line
struct Screen<W> {
    out: W,
    /// The input prompt is redrawn after every finished line
    prompt: bool,
    /// The placeholder owns the bottom line
    placeholder: bool,
}

impl<W: Write> Screen<W> {
    /// Wipe the bottom line (prompt or placeholder) before writing over it
    fn begin_line(&mut self) -> io::Result<()> {
        queue!(self.out, Print('\r'), Clear(ClearType::CurrentLine))
    }

    fn end_line(&mut self) -> io::Result<()> {
        queue!(self.out, Print("\r\n"))?;
        if self.prompt && !self.placeholder {
            queue!(self.out, Print(PROMPT))?;
        }
        self.out.flush()
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            queue!(self.out, Print(first))?;
        }
        for line in lines {
            queue!(self.out, Print("\r\n"), Print(line))?;
        }
        Ok(())
    }

    fn styled(&mut self, attribute: Attribute, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(attribute),
            Print(text),
            SetAttribute(Attribute::Reset)
        )
    }

    fn colored(&mut self, color: Color, text: &str) -> io::Result<()> {
        queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)
    }

    fn placeholder_frame(&mut self, frame: &str) -> io::Result<()> {
        self.begin_line()?;
        self.styled(Attribute::Dim, &format!("{PLACEHOLDER_TEXT}{frame}"))?;
        self.out.flush()
    }

    /// One complete line in the log
    fn line(&mut self, draw: impl FnOnce(&mut Self) -> io::Result<()>) -> io::Result<()> {
        self.begin_line()?;
        draw(self)?;
        self.end_line()
    }
}

fn report(result: io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Terminal write failed");
    }
}

/// Writes reveal ops straight to the screen
struct RevealWriter<W> {
    screen: Arc<Mutex<Screen<W>>>,
}

impl<W: Write + Send + 'static> RevealSink for RevealWriter<W> {
    fn apply(&mut self, op: RevealOp) {
        let mut screen = self.screen.lock().unwrap();
        let result = match op {
            RevealOp::Insert('\n') => queue!(screen.out, Print("\r\n")),
            RevealOp::Insert(c) => queue!(screen.out, Print(c)),
            RevealOp::ShowCaret => queue!(screen.out, Print(CARET)),
            RevealOp::HideCaret => {
                queue!(screen.out, MoveLeft(1), Clear(ClearType::UntilNewLine))
            }
        };
        report(result.and_then(|()| screen.out.flush()));
    }

    fn finish(&mut self) {
        report(self.screen.lock().unwrap().end_line());
    }
}

/// Presenter drawing to a plain line terminal
///
/// Any new output settles a running reveal first, so text never
/// interleaves with a half-typed message.
pub struct TerminalPresenter<W: Write + Send + 'static> {
    screen: Arc<Mutex<Screen<W>>>,
    reveal: tokio::sync::Mutex<Option<RevealHandle>>,
    placeholder: tokio::sync::Mutex<Option<PlaceholderHandle>>,
    type_delay: Duration,
    ellipsis_interval: Duration,
}

impl<W: Write + Send + 'static> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen {
                out,
                prompt: true,
                placeholder: false,
            })),
            reveal: tokio::sync::Mutex::new(None),
            placeholder: tokio::sync::Mutex::new(None),
            type_delay: DEFAULT_TYPE_DELAY,
            ellipsis_interval: DEFAULT_ELLIPSIS_INTERVAL,
        }
    }

    pub fn with_type_delay(mut self, delay: Duration) -> Self {
        self.type_delay = delay;
        self
    }

    pub fn with_ellipsis_interval(mut self, interval: Duration) -> Self {
        self.ellipsis_interval = interval;
        self
    }

    /// Output-only mode: no input prompt
    pub fn without_prompt(self) -> Self {
        self.screen.lock().unwrap().prompt = false;
        self
    }

    fn draw(&self, f: impl FnOnce(&mut Screen<W>) -> io::Result<()>) {
        report(f(&mut self.screen.lock().unwrap()));
    }

    /// Finish the running reveal at once
    async fn settle_reveal(&self) {
        let handle = self.reveal.lock().await.take();
        if let Some(handle) = handle {
            handle.cancel().await;
        }
    }

    async fn stop_placeholder(&self) {
        let handle = self.placeholder.lock().await.take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    /// Settle the running reveal and draw while still holding its slot, so
    /// a reveal started meanwhile cannot slip in ahead of this output
    async fn draw_settled(&self, f: impl FnOnce(&mut Screen<W>) -> io::Result<()> + Send) {
        let mut slot = self.reveal.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel().await;
        }
        self.draw(f);
    }

    async fn notice_line(&self, text: &str) {
        self.draw_settled(|screen| screen.line(|s| s.styled(Attribute::Dim, text)))
            .await;
    }
}

#[async_trait]
impl<W: Write + Send + 'static> Presenter for TerminalPresenter<W> {
    async fn show_message(&self, message: &Message, style: RevealStyle) {
        let Some(label) = label(message.role) else {
            return;
        };

        let mut slot = self.reveal.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel().await;
        }

        match style {
            RevealStyle::Instant => self.draw(|screen| {
                screen.line(|s| {
                    s.styled(Attribute::Bold, label)?;
                    s.text(" ")?;
                    s.text(&message.content)
                })
            }),
            RevealStyle::Typewriter => {
                self.draw(|screen| {
                    screen.begin_line()?;
                    screen.styled(Attribute::Bold, label)?;
                    queue!(screen.out, Print(' '))?;
                    screen.out.flush()
                });
                let writer = RevealWriter {
                    screen: Arc::clone(&self.screen),
                };
                *slot = Some(spawn_reveal(&message.content, self.type_delay, writer));
            }
        }
    }

    async fn show_placeholder(&self) {
        self.settle_reveal().await;
        self.stop_placeholder().await;

        self.screen.lock().unwrap().placeholder = true;
        let screen = Arc::clone(&self.screen);
        let handle = spawn_placeholder(self.ellipsis_interval, move |frame| {
            report(screen.lock().unwrap().placeholder_frame(frame));
        });
        *self.placeholder.lock().await = Some(handle);
    }

    async fn clear_placeholder(&self) {
        self.stop_placeholder().await;
        self.draw(|screen| {
            screen.placeholder = false;
            screen.begin_line()?;
            screen.out.flush()
        });
    }

    async fn show_error(&self, text: &str) {
        self.draw_settled(|screen| {
            screen.line(|s| s.colored(Color::Red, &format!("Error: {text}")))
        })
        .await;
    }

    async fn show_notice(&self, text: &str) {
        self.notice_line(text).await;
    }

    async fn show_character(&self, panel: &CharacterPanel) {
        self.draw_settled(|screen| match panel {
            CharacterPanel::Error(text) => screen.line(|s| s.colored(Color::Red, text)),
            CharacterPanel::Sheet(sheet) => {
                for section in &sheet.sections {
                    screen.line(|s| s.styled(Attribute::Bold, section.title))?;
                    for entry in &section.entries {
                        screen.line(|s| s.text(&format!("  {entry}")))?;
                    }
                }
                Ok(())
            }
        })
        .await;
    }

    async fn show_dice_rolling(&self, sides: u32) {
        self.notice_line(&format!("Rolling a d{sides}...")).await;
    }

    async fn show_dice_result(&self, sides: u32, value: u32) {
        self.draw_settled(|screen| {
            screen.line(|s| {
                s.text(&format!("d{sides}: "))?;
                s.styled(Attribute::Bold, &value.to_string())
            })
        })
        .await;
    }

    async fn clear_input(&self) {
        self.draw(|screen| {
            screen.prompt = true;
            screen.begin_line()?;
            if !screen.placeholder {
                queue!(screen.out, Print(PROMPT))?;
            }
            screen.out.flush()
        });
    }

    async fn scroll_to_bottom(&self) {
        self.draw(|screen| screen.out.flush());
    }

    async fn settle(&self) {
        self.settle_reveal().await;
        self.stop_placeholder().await;
        self.draw(|screen| {
            screen.placeholder = false;
            screen.prompt = false;
            screen.begin_line()?;
            screen.out.flush()
        });
    }
}
