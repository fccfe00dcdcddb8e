use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";
const SINE_COLOR: Color = Color::from_rgb(0.18, 0.72, 0.89);
const PWM_COLOR: Color = Color::from_rgba(0.95, 0.55, 0.2, 0.7);

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "PWM Representation of Sine Wave".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    config: ConfigForm,
    plot: SignalPlot,
    payload: Option<VisualizationPayload>,
    file_path: String,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    PayloadFetched(Result<VisualizationPayload, String>),
    ConfigFieldChanged(ConfigField, String),
    SubmitConfig,
    ConfigSubmitted(Result<String, String>),
    FilePathChanged(String),
    LoadFile,
}

#[derive(Debug, Clone, Copy)]
enum ConfigField {
    Output,
    PwmFrequency,
    SineAmplitude,
    SineFrequency,
    Duration,
    Timestep,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                config: ConfigForm::default(),
                plot: SignalPlot::default(),
                payload: None,
                file_path: "pwm_sine_wave.txt".into(),
                status: "Waiting for waveform...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_payload(), Message::PayloadFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_payload(), Message::PayloadFetched),
            Message::PayloadFetched(Ok(payload)) => {
                if state.payload.as_ref() != Some(&payload) {
                    state.push_history(format!(
                        "Waveform: {} of {} samples from {}",
                        payload.time.len(),
                        payload.total_samples,
                        payload.output
                    ));
                }
                state.plot = SignalPlot::from_payload(&payload);
                state.status = format!(
                    "Carrier {} Hz, sine {} Hz, amplitude {}",
                    payload.pwm_frequency, payload.sine_frequency, payload.sine_amplitude
                );
                state.payload = Some(payload);
                Task::none()
            }
            Message::PayloadFetched(Err(err)) => {
                if state.payload.is_some() {
                    state.status = format!("Bridge error: {err}");
                }
                Task::none()
            }
            Message::ConfigFieldChanged(field, value) => {
                state.config.update_field(field, value);
                Task::none()
            }
            Message::SubmitConfig => match state.config.to_payload() {
                Ok(payload) => Task::perform(post_config(payload), Message::ConfigSubmitted),
                Err(err) => {
                    state.status = format!("Config error: {err}");
                    Task::none()
                }
            },
            Message::ConfigSubmitted(Ok(message)) => {
                state.push_history(message.clone());
                state.status = message;
                Task::perform(fetch_payload(), Message::PayloadFetched)
            }
            Message::ConfigSubmitted(Err(err)) => {
                state.status = format!("Config error: {err}");
                Task::none()
            }
            Message::FilePathChanged(value) => {
                state.file_path = value;
                Task::none()
            }
            Message::LoadFile => {
                match pwmcore::pwl::read_file(state.file_path.trim()) {
                    Ok(records) => {
                        state.plot = SignalPlot::from_records(&records);
                        state.payload = None;
                        state.status = format!("Loaded {} records", records.len());
                        state.push_history(format!("File: {}", state.file_path));
                    }
                    Err(err) => state.status = format!("File error: {err}"),
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let config_column = column![
            text("Signal Config").size(26),
            text_input("Output file", &state.config.output)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Output, value))
                .padding(6),
            text_input("PWM frequency (Hz)", &state.config.pwm_frequency)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::PwmFrequency, value))
                .padding(6),
            text_input("Sine amplitude", &state.config.sine_amplitude)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::SineAmplitude, value))
                .padding(6),
            text_input("Sine frequency (Hz)", &state.config.sine_frequency)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::SineFrequency, value))
                .padding(6),
            text_input("Duration (s)", &state.config.duration)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Duration, value))
                .padding(6),
            text_input("Timestep (s)", &state.config.timestep)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Timestep, value))
                .padding(6),
            button("Generate").on_press(Message::SubmitConfig).padding(10),
            text(&state.status).size(14),
            text("Open PWL file").size(18),
            text_input("Path", &state.file_path)
                .on_input(Message::FilePathChanged)
                .padding(6),
            button("Load").on_press(Message::LoadFile).padding(10),
            column![
                text("Parameter definitions").size(16),
                text("PWM frequency: carrier repetition rate of the pulse train.").size(12),
                text("Sine amplitude: value written for the high state.").size(12),
                text("Sine frequency: frequency of the modulating reference.").size(12),
                text("Duration: total simulated time written to the file.").size(12),
                text("Timestep: sampling interval; must resolve the carrier period.").size(12),
            ]
            .spacing(4)
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let plot = Canvas::new(state.plot.clone())
            .width(Length::Fill)
            .height(Length::Fixed(420.0));

        let legend = row![
            text("Sine Wave").size(14).color(SINE_COLOR),
            text("PWM Signal").size(14).color(PWM_COLOR),
        ]
        .spacing(20);

        let axis_label = text(format!(
            "Time (s): {:.6e} .. {:.6e}   Amplitude: 0 .. 1",
            state.plot.start_time(),
            state.plot.end_time()
        ))
        .size(14);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let plot_column = column![
            text("PWM Representation of Sine Wave").size(26),
            legend,
            plot,
            axis_label,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(120.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![config_column, plot_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

async fn fetch_payload() -> Result<VisualizationPayload, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/waveform"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<VisualizationPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_config(config: GenerateRequest) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{BRIDGE_URL}/generate"))
        .json(&config)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    if status.is_success() {
        Ok(format!(
            "Generated {} records",
            body.get("records").and_then(|v| v.as_u64()).unwrap_or(0)
        ))
    } else {
        let reason = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        Err(format!("{}: {}", status, reason))
    }
}

#[derive(Debug, Clone)]
struct ConfigForm {
    output: String,
    pwm_frequency: String,
    sine_amplitude: String,
    sine_frequency: String,
    duration: String,
    timestep: String,
}

impl ConfigForm {
    fn default() -> Self {
        Self {
            output: "pwm_sine_wave.txt".into(),
            pwm_frequency: "10000".into(),
            sine_amplitude: "24.0".into(),
            sine_frequency: "100".into(),
            duration: "0.1".into(),
            timestep: "1e-6".into(),
        }
    }

    fn update_field(&mut self, field: ConfigField, value: String) {
        match field {
            ConfigField::Output => self.output = value,
            ConfigField::PwmFrequency => self.pwm_frequency = value,
            ConfigField::SineAmplitude => self.sine_amplitude = value,
            ConfigField::SineFrequency => self.sine_frequency = value,
            ConfigField::Duration => self.duration = value,
            ConfigField::Timestep => self.timestep = value,
        }
    }

    fn to_payload(&self) -> Result<GenerateRequest, String> {
        Ok(GenerateRequest {
            output: if self.output.trim().is_empty() {
                None
            } else {
                Some(self.output.trim().to_string())
            },
            pwm_frequency: parse_number("PWM frequency", &self.pwm_frequency)?,
            sine_amplitude: parse_number("sine amplitude", &self.sine_amplitude)?,
            sine_frequency: parse_number("sine frequency", &self.sine_frequency)?,
            duration: parse_number("duration", &self.duration)?,
            timestep: parse_number("timestep", &self.timestep)?,
        })
    }
}

fn parse_number(label: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{label} {value:?} is not a number"))
}

// A blank output path lets the generator keep its configured file.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    pwm_frequency: f64,
    sine_amplitude: f64,
    sine_frequency: f64,
    duration: f64,
    timestep: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct VisualizationPayload {
    #[serde(default)]
    time: Vec<f64>,
    #[serde(default)]
    reference: Vec<f64>,
    #[serde(default)]
    pwm: Vec<f64>,
    #[serde(default)]
    total_samples: usize,
    #[serde(default)]
    pwm_frequency: f64,
    #[serde(default)]
    sine_frequency: f64,
    #[serde(default)]
    sine_amplitude: f64,
    #[serde(default)]
    output: String,
}

/// Normalized reference (line) and pulse train (post-step) sharing one time axis.
#[derive(Debug, Clone, Default)]
struct SignalPlot {
    time: Vec<f64>,
    reference: Vec<f64>,
    pwm: Vec<f64>,
}

impl SignalPlot {
    fn from_payload(payload: &VisualizationPayload) -> Self {
        Self {
            time: payload.time.clone(),
            reference: payload.reference.clone(),
            pwm: payload.pwm.clone(),
        }
    }

    fn from_records(records: &[pwmcore::PwlRecord]) -> Self {
        let peak = records
            .iter()
            .map(|record| record.value.amplitude().abs())
            .fold(0.0, f64::max);
        let scale = if peak > 0.0 { peak } else { 1.0 };
        Self {
            time: records.iter().map(|record| record.time).collect(),
            reference: Vec::new(),
            pwm: records
                .iter()
                .map(|record| record.value.amplitude() / scale)
                .collect(),
        }
    }

    fn start_time(&self) -> f64 {
        self.time.first().copied().unwrap_or(0.0)
    }

    fn end_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }

    fn project(&self, bounds: Rectangle, time: f64, value: f64) -> Point {
        let margin = 12.0;
        let span = (self.end_time() - self.start_time()).max(f64::EPSILON);
        let width = bounds.width - 2.0 * margin;
        let height = bounds.height - 2.0 * margin;
        let x = margin + ((time - self.start_time()) / span) as f32 * width;
        let y = margin + (1.0 - value.clamp(-0.05, 1.05) as f32) * height;
        Point::new(x, y)
    }
}

impl canvas::Program<Message> for SignalPlot {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let grid = Path::new(|builder| {
            for step in 0..=4 {
                let level = step as f64 / 4.0;
                builder.move_to(self.project(bounds, self.start_time(), level));
                builder.line_to(self.project(bounds, self.end_time(), level));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.2, 0.2, 0.25)),
        );

        if self.time.len() > 1 && self.reference.len() == self.time.len() {
            let sine = Path::new(|builder| {
                for (i, (&t, &value)) in self.time.iter().zip(&self.reference).enumerate() {
                    let point = self.project(bounds, t, value);
                    if i == 0 {
                        builder.move_to(point);
                    } else {
                        builder.line_to(point);
                    }
                }
            });
            frame.stroke(&sine, Stroke::default().with_width(2.0).with_color(SINE_COLOR));
        }

        if self.time.len() > 1 && self.pwm.len() == self.time.len() {
            let pulses = Path::new(|builder| {
                builder.move_to(self.project(bounds, self.time[0], self.pwm[0]));
                for i in 1..self.time.len() {
                    builder.line_to(self.project(bounds, self.time[i], self.pwm[i - 1]));
                    builder.line_to(self.project(bounds, self.time[i], self.pwm[i]));
                }
            });
            frame.stroke(&pulses, Stroke::default().with_width(1.0).with_color(PWM_COLOR));
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmcore::{PwlRecord, PwmLevel};

    #[test]
    fn records_are_normalized_by_peak_amplitude() {
        let records = vec![
            PwlRecord {
                time: 0.0,
                value: PwmLevel::High(24.0),
            },
            PwlRecord {
                time: 1e-6,
                value: PwmLevel::Low,
            },
        ];
        let plot = SignalPlot::from_records(&records);
        assert_eq!(plot.pwm, vec![1.0, 0.0]);
        assert!(plot.reference.is_empty());
        assert_eq!(plot.end_time(), 1e-6);
    }

    #[test]
    fn unparsable_field_blocks_request() {
        let mut form = ConfigForm::default();
        form.update_field(ConfigField::Timestep, "fast".into());
        let err = form.to_payload().unwrap_err();
        assert!(err.contains("timestep"));

        form.update_field(ConfigField::Timestep, String::new());
        assert!(form.to_payload().is_err());
    }

    #[test]
    fn default_form_sends_every_parameter() {
        let body = serde_json::to_value(ConfigForm::default().to_payload().unwrap()).unwrap();
        assert_eq!(body["pwm_frequency"], 10_000.0);
        assert_eq!(body["timestep"], 1e-6);
        assert_eq!(body["output"], "pwm_sine_wave.txt");
    }
}
