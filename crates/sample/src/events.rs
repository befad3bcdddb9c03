//! Typed frame events and the services a frame handler may touch.

use crowdwalk_input::InputSource;
use crowdwalk_render::RenderService;
use crowdwalk_tools::ButtonId;
use std::collections::VecDeque;

/// Events raised by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Pressed(ButtonId),
}

/// Everything the sample reacts to within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleEvent {
    Ui(UiEvent),
    /// General update. Carries the frame time step in seconds.
    Update { time_step: f32 },
    /// Raised once the frame's draw calls are defined, before they execute.
    PostRenderUpdate,
}

impl From<UiEvent> for SampleEvent {
    fn from(event: UiEvent) -> Self {
        Self::Ui(event)
    }
}

/// FIFO of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SampleEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: impl Into<SampleEvent>) {
        self.events.push_back(event.into());
    }

    pub fn pop(&mut self) -> Option<SampleEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Services handed to the sample for one frame.
pub struct FrameContext<'a> {
    pub input: &'a dyn InputSource,
    /// True while a UI widget holds keyboard or pointer focus.
    pub ui_focus: bool,
    pub renderer: &'a mut dyn RenderService,
}

impl<'a> FrameContext<'a> {
    pub fn new(input: &'a dyn InputSource, renderer: &'a mut dyn RenderService) -> Self {
        Self {
            input,
            ui_focus: false,
            renderer,
        }
    }

    pub fn with_ui_focus(mut self, focus: bool) -> Self {
        self.ui_focus = focus;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwalk_render::ShaderParam;

    #[test]
    fn queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.push(UiEvent::Pressed(ButtonId::increase(ShaderParam::Beta)));
        queue.push(SampleEvent::Update { time_step: 0.1 });
        queue.push(SampleEvent::PostRenderUpdate);
        assert_eq!(queue.len(), 3);
        assert!(matches!(queue.pop(), Some(SampleEvent::Ui(_))));
        assert_eq!(queue.pop(), Some(SampleEvent::Update { time_step: 0.1 }));
        assert_eq!(queue.pop(), Some(SampleEvent::PostRenderUpdate));
        assert!(queue.is_empty());
    }
}
