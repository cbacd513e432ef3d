//! Edge detection with one-shot latches
//!
//! Each edge is a two-state machine: `Armed` → `Latched` when the edge is
//! reached, `Latched` → `Armed` once the scroll position leaves it.

use crate::config::{AutoScrollConfig, ScrollDirection};

use super::host::ScrollOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    End,
}

impl Edge {
    /// The edge a given direction is travelling towards
    pub fn ahead_of(direction: ScrollDirection) -> Self {
        match direction {
            ScrollDirection::Down => Edge::End,
            ScrollDirection::Up => Edge::Top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeLatch {
    #[default]
    Armed,
    Latched,
}

/// Which edge conditions currently hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeReading {
    pub at_top: bool,
    pub at_bottom: bool,
}

impl EdgeReading {
    /// Read the owner's geometry against tolerances and offsets
    pub fn measure(owner: &dyn ScrollOwner, config: &AutoScrollConfig) -> Self {
        Self::from_geometry(
            owner.scroll_top(),
            owner.client_height(),
            owner.scroll_height(),
            config,
        )
    }

    pub fn from_geometry(
        scroll_top: f64,
        client_height: f64,
        scroll_height: f64,
        config: &AutoScrollConfig,
    ) -> Self {
        Self {
            at_top: scroll_top <= config.top_tolerance + config.start_offset,
            at_bottom: scroll_top + client_height
                >= scroll_height - config.bottom_tolerance - config.end_offset,
        }
    }

    pub fn holds(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.at_top,
            Edge::End => self.at_bottom,
        }
    }
}

/// Latches for both edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Boundaries {
    top: EdgeLatch,
    end: EdgeLatch,
}

impl Boundaries {
    pub fn is_latched(&self, edge: Edge) -> bool {
        self.latch(edge) == EdgeLatch::Latched
    }

    /// Latch `edge`. Returns true only on the armed → latched transition.
    pub fn arrive(&mut self, edge: Edge) -> bool {
        let slot = self.slot(edge);
        let fresh = *slot == EdgeLatch::Armed;
        *slot = EdgeLatch::Latched;
        fresh
    }

    /// Re-arm `edge` unconditionally
    pub fn rearm(&mut self, edge: Edge) {
        *self.slot(edge) = EdgeLatch::Armed;
    }

    /// Re-arm every latched edge whose condition no longer holds
    pub fn release_departed(&mut self, reading: EdgeReading) {
        for edge in [Edge::Top, Edge::End] {
            if self.is_latched(edge) && !reading.holds(edge) {
                self.rearm(edge);
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn latch(&self, edge: Edge) -> EdgeLatch {
        match edge {
            Edge::Top => self.top,
            Edge::End => self.end,
        }
    }

    fn slot(&mut self, edge: Edge) -> &mut EdgeLatch {
        match edge {
            Edge::Top => &mut self.top,
            Edge::End => &mut self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_with_tolerance_and_offset() {
        let mut config = AutoScrollConfig::new(10.0);
        // range: 0..=600
        let reading = EdgeReading::from_geometry(598.5, 400.0, 1000.0, &config);
        assert!(reading.at_bottom);
        assert!(!reading.at_top);

        let reading = EdgeReading::from_geometry(590.0, 400.0, 1000.0, &config);
        assert!(!reading.at_bottom);

        config.end_offset = 20.0;
        let reading = EdgeReading::from_geometry(590.0, 400.0, 1000.0, &config);
        assert!(reading.at_bottom);

        config.start_offset = 50.0;
        let reading = EdgeReading::from_geometry(51.0, 400.0, 1000.0, &config);
        assert!(reading.at_top);
    }

    #[test]
    fn test_latch_fires_once() {
        let mut boundaries = Boundaries::default();
        assert!(boundaries.arrive(Edge::End));
        assert!(!boundaries.arrive(Edge::End));
        assert!(boundaries.is_latched(Edge::End));
        assert!(!boundaries.is_latched(Edge::Top));
    }

    #[test]
    fn test_departure_rearms() {
        let mut boundaries = Boundaries::default();
        boundaries.arrive(Edge::End);
        boundaries.arrive(Edge::Top);

        boundaries.release_departed(EdgeReading {
            at_top: true,
            at_bottom: false,
        });
        assert!(!boundaries.is_latched(Edge::End));
        assert!(boundaries.is_latched(Edge::Top));
        assert!(boundaries.arrive(Edge::End));
    }

    #[test]
    fn test_edge_ahead_of_direction() {
        assert_eq!(Edge::ahead_of(ScrollDirection::Down), Edge::End);
        assert_eq!(Edge::ahead_of(ScrollDirection::Up), Edge::Top);
    }
}
