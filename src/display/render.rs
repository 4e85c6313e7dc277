use crate::display::Channel;
/// Consumer of ready-to-plot sample arrays, called once per enabled channel per tick.
pub trait Renderer {
    fn publish(&mut self, channel: Channel, x_axis: &[f64], y_axis: &[f64]);
}
/// Latest published curve for one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotFrame {
    pub channel: Channel,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
/// Renderer that keeps the most recent frame per channel.
#[derive(Debug, Default)]
pub struct LatestFrames {
    frames: [Option<PlotFrame>; 2],
    publishes: u64,
}
impl LatestFrames {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn frame(&self, channel: Channel) -> Option<&PlotFrame> {
        self.frames[channel.index()].as_ref()
    }
    pub fn frames(&self) -> impl Iterator<Item = &PlotFrame> {
        self.frames.iter().flatten()
    }
    pub fn publish_count(&self) -> u64 {
        self.publishes
    }
}
impl Renderer for LatestFrames {
    fn publish(&mut self, channel: Channel, x_axis: &[f64], y_axis: &[f64]) {
        let slot = &mut self.frames[channel.index()];
        match slot {
            Some(frame) => {
                frame.x.clear();
                frame.x.extend_from_slice(x_axis);
                frame.y.clear();
                frame.y.extend_from_slice(y_axis);
            }
            None => {
                *slot = Some(PlotFrame {
                    channel,
                    x: x_axis.to_vec(),
                    y: y_axis.to_vec(),
                });
            }
        }
        self.publishes += 1;
    }
}
