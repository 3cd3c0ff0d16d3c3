mod catalog;
mod circuit;
mod transforms;

use std::time::Duration;

use catalog::ComponentKind;
use circuit::solver::{self, Measurements};
use circuit::{Circuit, Electrical};
use transforms::{CSBox, CSPoint, Point};

use iced::time::Instant;
use iced::widget::canvas::event::{self, Event};
use iced::widget::canvas::{Cache, Cursor, Geometry};
use iced::widget::{button, canvas, column, row, text};
use iced::{
    executor, mouse, Application, Color, Command, Element, Length, Rectangle, Settings,
    Subscription, Theme,
};
use infobar::infobar;
use tracing::{debug, info};
use value_editor::value_editor;

pub fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    VoltLab::run(Settings {
        window: iced::window::Settings {
            size: (900, 620),
            ..iced::window::Settings::default()
        },
        antialiasing: true,
        ..Settings::default()
    })
}

/// application state - owns the circuit, power state, measurements, and caches
struct VoltLab {
    circuit: Circuit,
    powered: bool,
    measurements: Measurements,

    /// value editor text
    value_text: String,
    /// fraction of each wire segment traversed by the flow marker
    flow_phase: f32,
    epoch: Instant,

    active_cache: Cache,
    passive_cache: Cache,
    background_cache: Cache,
}

#[derive(Debug, Clone)]
pub enum Msg {
    PaletteAdd(ComponentKind),
    CanvasClick(CSPoint),

    ValueInputChanged(String),
    ValueInputSubmit,
    ToggleSwitch,
    DeleteSelected,

    TogglePower,
    Reset,
    Tick(Instant),
}

impl Application for VoltLab {
    type Executor = executor::Default;
    type Message = Msg;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<Msg>) {
        (
            VoltLab {
                circuit: Circuit::default(),
                powered: false,
                measurements: Measurements::ZERO,

                value_text: String::from(""),
                flow_phase: 0.0,
                epoch: Instant::now(),

                active_cache: Default::default(),
                passive_cache: Default::default(),
                background_cache: Default::default(),
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        String::from("VoltLab - Series Circuit Sandbox")
    }

    fn update(&mut self, message: Msg) -> Command<Msg> {
        match message {
            Msg::PaletteAdd(kind) => {
                self.circuit.add(kind);
                self.sync_editor();
                self.refresh();
            }
            Msg::CanvasClick(csp) => {
                self.circuit.select_at(csp);
                self.sync_editor();
                self.passive_cache.clear();
                self.active_cache.clear();
            }
            Msg::ValueInputChanged(s) => {
                self.value_text = s;
            }
            Msg::ValueInputSubmit => {
                if let Some(id) = self.circuit.selected_id() {
                    match self.circuit.set_value(id, &self.value_text) {
                        Ok(()) => self.refresh(),
                        Err(e) => debug!(%e, "rejected value edit"),
                    }
                }
                // editor shows the canonical value, accepted or not
                self.sync_editor();
            }
            Msg::ToggleSwitch => {
                if let Some(id) = self.circuit.selected_id() {
                    self.circuit.toggle_switch(id);
                    self.sync_editor();
                    self.refresh();
                }
            }
            Msg::DeleteSelected => {
                if let Some(id) = self.circuit.selected_id() {
                    self.circuit.remove(id);
                    self.sync_editor();
                    self.refresh();
                }
            }
            Msg::TogglePower => {
                self.powered = !self.powered;
                info!(powered = self.powered, "power toggled");
                self.refresh();
            }
            Msg::Reset => {
                self.circuit.reset();
                self.powered = false;
                self.value_text.clear();
                self.refresh();
            }
            Msg::Tick(now) => {
                self.flow_phase =
                    (now.duration_since(self.epoch).as_millis() % 1000) as f32 / 1000.0;
                self.measurements = solver::evaluate(self.circuit.components(), self.powered);
                self.active_cache.clear();
            }
        }
        Command::none()
    }

    /// periodic tick while powered, driving the flow animation and live
    /// re-evaluation; dropped as soon as power goes off
    fn subscription(&self) -> Subscription<Msg> {
        if self.powered {
            iced::time::every(Duration::from_millis(100)).map(Msg::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<Msg> {
        let palette = ComponentKind::ALL
            .iter()
            .fold(row![], |r, kind| {
                r.push(button(catalog::entry(*kind).label).on_press(Msg::PaletteAdd(*kind)))
            })
            .push(
                button(if self.powered { "Power Off" } else { "Power On" })
                    .on_press(Msg::TogglePower),
            )
            .push(button("Reset").on_press(Msg::Reset))
            .spacing(10);

        let canvas = canvas(self as &Self).width(Length::Fill).height(Length::Fill);
        let infobar = infobar(self.measurements, self.powered);

        column![
            palette,
            row![
                self.editor_panel(),
                column![canvas, infobar].width(Length::Fill),
            ]
            .spacing(10),
        ]
        .spacing(10)
        .padding(10)
        .into()
    }
}

impl VoltLab {
    /// recompute measurements and repaint everything but the background
    fn refresh(&mut self) {
        self.measurements = solver::evaluate(self.circuit.components(), self.powered);
        self.passive_cache.clear();
        self.active_cache.clear();
    }

    /// keep the editor text consistent with the canonical selected instance
    fn sync_editor(&mut self) {
        self.value_text = self
            .circuit
            .selected()
            .map(|c| c.electrical.summary())
            .unwrap_or_default();
    }

    fn editor_panel(&self) -> Element<Msg> {
        if let Some(comp) = self.circuit.selected() {
            let entry = catalog::entry(comp.kind);
            let mut col = column![text(entry.label).size(20)].spacing(10).width(130);
            match comp.electrical {
                Electrical::Switch { is_closed } => {
                    col = col.push(
                        button(if is_closed { "Open" } else { "Close" })
                            .on_press(Msg::ToggleSwitch),
                    );
                }
                Electrical::Battery { .. } => {
                    col = col.push(value_editor(
                        self.value_text.clone(),
                        "V",
                        Msg::ValueInputChanged,
                        || Msg::ValueInputSubmit,
                    ));
                }
                Electrical::Resistor { .. } | Electrical::Led { .. } => {
                    col = col.push(value_editor(
                        self.value_text.clone(),
                        "\u{03a9}",
                        Msg::ValueInputChanged,
                        || Msg::ValueInputSubmit,
                    ));
                }
            }
            col = col.push(button("Delete").on_press(Msg::DeleteSelected));
            col.into()
        } else {
            column![text("click a component to edit it").size(14)]
                .width(130)
                .into()
        }
    }
}

impl canvas::Program<Msg> for VoltLab {
    type State = ();

    fn update(
        &self,
        _state: &mut (),
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (event::Status, Option<Msg>) {
        // key events are only acted on while the cursor is over the canvas,
        // otherwise deleting would fire while typing in the value editor
        let msg = if let Some(p) = cursor.position_in(&bounds) {
            match event {
                Event::Mouse(iced::mouse::Event::ButtonPressed(iced::mouse::Button::Left)) => {
                    Some(Msg::CanvasClick(Point::from(p).into()))
                }
                Event::Keyboard(iced::keyboard::Event::KeyPressed {
                    key_code: iced::keyboard::KeyCode::Delete,
                    modifiers: _,
                }) => self.circuit.selected_id().map(|_| Msg::DeleteSelected),
                _ => None,
            }
        } else {
            None
        };

        if msg.is_some() {
            (event::Status::Captured, msg)
        } else {
            (event::Status::Ignored, msg)
        }
    }

    fn draw(
        &self,
        _state: &(),
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let background = self.background_cache.draw(bounds.size(), |frame| {
            let f = canvas::Fill {
                style: canvas::Style::Solid(Color::WHITE),
                ..canvas::Fill::default()
            };
            frame.fill_rectangle(iced::Point::ORIGIN, bounds.size(), f);
            circuit::draw_grid(
                frame,
                CSBox::from_points([
                    CSPoint::origin(),
                    CSPoint::new(bounds.width, bounds.height),
                ]),
            );
        });

        let passive = self.passive_cache.draw(bounds.size(), |frame| {
            self.circuit
                .draw_passive(frame, self.powered && self.measurements.live());
        });

        let active = self.active_cache.draw(bounds.size(), |frame| {
            if self.powered && self.measurements.live() {
                self.circuit.draw_flow(frame, self.flow_phase);
                self.circuit.draw_glow(frame, self.measurements.current_ma);
            }
        });

        vec![background, passive, active]
    }

    fn mouse_interaction(
        &self,
        _state: &(),
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if let Some(p) = cursor.position_in(&bounds) {
            if self.circuit.hit_test(Point::from(p).into()).is_some() {
                return mouse::Interaction::Pointer;
            }
        }
        mouse::Interaction::default()
    }
}

mod infobar {
    use iced::alignment;
    use iced::widget::{row, text};
    use iced::{Element, Renderer};
    use iced_lazy::{component, Component};

    use crate::circuit::solver::Measurements;

    pub struct InfoBar {
        measurements: Measurements,
        powered: bool,
    }

    impl InfoBar {
        pub fn new(measurements: Measurements, powered: bool) -> Self {
            Self {
                measurements,
                powered,
            }
        }
    }

    pub fn infobar(measurements: Measurements, powered: bool) -> InfoBar {
        InfoBar::new(measurements, powered)
    }

    impl<Message> Component<Message, Renderer> for InfoBar {
        type State = ();
        type Event = ();

        fn update(&mut self, _state: &mut Self::State, _event: ()) -> Option<Message> {
            None
        }
        fn view(&self, _state: &Self::State) -> Element<(), Renderer> {
            let m = self.measurements.rounded();
            row![
                text(format!("{:.2} V", m.voltage_v))
                    .size(16)
                    .height(16)
                    .vertical_alignment(alignment::Vertical::Center),
                text(format!("{:.2} mA", m.current_ma))
                    .size(16)
                    .height(16)
                    .vertical_alignment(alignment::Vertical::Center),
                text(format!("{:.2} W", m.power_w))
                    .size(16)
                    .height(16)
                    .vertical_alignment(alignment::Vertical::Center),
                text(if self.powered {
                    "power: on"
                } else {
                    "power: off"
                })
                .size(16)
                .height(16)
                .vertical_alignment(alignment::Vertical::Center),
            ]
            .spacing(10)
            .into()
        }
    }

    impl<'a, Message> From<InfoBar> for Element<'a, Message, Renderer>
    where
        Message: 'a,
    {
        fn from(infobar: InfoBar) -> Self {
            component(infobar)
        }
    }
}

mod value_editor {
    use iced::widget::{button, column, row, text, text_input};
    use iced::{Element, Length, Renderer};
    use iced_lazy::{component, Component};

    #[derive(Debug, Clone)]
    pub enum Evt {
        Edited(String),
        Submitted,
    }

    /// numeric field editor for the selected component, with a unit suffix
    /// the set button is only pressable while the text parses to a finite number
    pub struct ValueEditor<Message> {
        value: String,
        unit: &'static str,
        on_change: Box<dyn Fn(String) -> Message>,
        on_submit: Box<dyn Fn() -> Message>,
    }

    pub fn value_editor<Message>(
        value: String,
        unit: &'static str,
        on_change: impl Fn(String) -> Message + 'static,
        on_submit: impl Fn() -> Message + 'static,
    ) -> ValueEditor<Message> {
        ValueEditor {
            value,
            unit,
            on_change: Box::new(on_change),
            on_submit: Box::new(on_submit),
        }
    }

    impl<Message> Component<Message, Renderer> for ValueEditor<Message> {
        type State = ();
        type Event = Evt;

        fn update(&mut self, _state: &mut Self::State, event: Evt) -> Option<Message> {
            match event {
                Evt::Edited(s) => Some((self.on_change)(s)),
                Evt::Submitted => Some((self.on_submit)()),
            }
        }
        fn view(&self, _state: &Self::State) -> Element<Evt, Renderer> {
            let parses = self
                .value
                .trim()
                .parse::<f32>()
                .map(|v| v.is_finite())
                .unwrap_or(false);
            let set = if parses {
                button("set").on_press(Evt::Submitted)
            } else {
                button("set")
            };
            column![
                row![
                    text_input("", &self.value)
                        .width(80)
                        .on_input(Evt::Edited)
                        .on_submit(Evt::Submitted),
                    text(self.unit).size(16),
                ]
                .spacing(5),
                set,
            ]
            .spacing(5)
            .width(Length::Shrink)
            .into()
        }
    }

    impl<'a, Message> From<ValueEditor<Message>> for Element<'a, Message, Renderer>
    where
        Message: 'a,
    {
        fn from(value_editor: ValueEditor<Message>) -> Self {
            component(value_editor)
        }
    }
}
