//! In-memory virtualized list used by the integration tests.
//!
//! Only `window` rows are mounted at a time. Scrolling unmounts rows that
//! leave the window and mounts fresh nodes for rows that enter it, so
//! attributes written onto a node are lost once its row scrolls away.
//! Identifiers are only visible in the hover region while the row is hovered.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use listwalk_core::{
    ContainerQuery, InteractionError, ItemScanner, ListItemHandle, PointerEvent,
    ScrollContainer, ScrollSurface,
};

/// One logical row.
#[derive(Debug, Clone)]
pub struct FakeRow {
    pub name: String,
    pub identifier: Option<String>,
    /// Identifier rendered inline instead of behind a hover.
    pub inline: bool,
}

impl FakeRow {
    pub fn hidden(name: &str, identifier: &str) -> Self {
        Self {
            name: name.to_string(),
            identifier: Some(identifier.to_string()),
            inline: false,
        }
    }

    pub fn inline(name: &str, identifier: &str) -> Self {
        Self {
            inline: true,
            ..Self::hidden(name, identifier)
        }
    }

    pub fn anonymous(name: &str) -> Self {
        Self {
            name: name.to_string(),
            identifier: None,
            inline: false,
        }
    }
}

struct MountedNode {
    row: usize,
    attrs: HashMap<String, String>,
}

struct ListState {
    rows: Vec<FakeRow>,
    window: usize,
    row_height: f64,
    offset: f64,
    next_node_id: u64,
    /// Node id to mounted node, in mount order.
    mounted: Vec<(u64, MountedNode)>,
    hovered: Option<u64>,
    polls_since_hover: u32,
    /// Polls needed before a hovered identifier shows up.
    reveal_after: u32,
    expose_positions: bool,
    role_marker: bool,
    /// Every scroll replaces all mounted nodes, even for rows that stay visible.
    recycle_all: bool,
    closed: bool,
    probe_log: Vec<u64>,
}

impl ListState {
    fn max_offset(&self) -> f64 {
        self.rows.len().saturating_sub(self.window) as f64 * self.row_height
    }

    fn remount(&mut self) {
        let first = (self.offset / self.row_height).floor() as usize;
        let last = (first + self.window).min(self.rows.len());

        if self.recycle_all {
            self.mounted.clear();
        }
        self.mounted.retain(|(_, node)| node.row >= first && node.row < last);
        for row in first..last {
            if !self.mounted.iter().any(|(_, node)| node.row == row) {
                self.next_node_id += 1;
                let node = MountedNode {
                    row,
                    attrs: HashMap::new(),
                };
                self.mounted.push((self.next_node_id, node));
            }
        }
        self.mounted.sort_by_key(|(_, node)| node.row);
        if let Some(hovered) = self.hovered {
            if !self.mounted.iter().any(|(id, _)| *id == hovered) {
                self.hovered = None;
            }
        }
    }

    fn node(&mut self, id: u64) -> Result<&mut MountedNode, InteractionError> {
        if self.closed {
            return Err(InteractionError::SessionClosed);
        }
        self.mounted
            .iter_mut()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, node)| node)
            .ok_or_else(|| InteractionError::Detached(format!("node {id}")))
    }
}

/// Shared handle to the simulated list.
#[derive(Clone)]
pub struct FakeList {
    state: Arc<Mutex<ListState>>,
}

impl FakeList {
    pub fn new(rows: Vec<FakeRow>, window: usize, row_height: f64) -> Self {
        let mut state = ListState {
            rows,
            window,
            row_height,
            offset: 0.0,
            next_node_id: 0,
            mounted: Vec::new(),
            hovered: None,
            polls_since_hover: 0,
            reveal_after: 2,
            expose_positions: false,
            role_marker: true,
            recycle_all: false,
            closed: false,
            probe_log: Vec::new(),
        };
        state.remount();
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// `count` rows with hover-revealed identifiers `contact_00`, `contact_01`, ...
    pub fn contacts(count: usize, window: usize, row_height: f64) -> Self {
        let rows = (0..count)
            .map(|i| FakeRow::hidden(&format!("Contact {i}"), &format!("contact_{i:02}")))
            .collect();
        Self::new(rows, window, row_height)
    }

    pub fn with_positions(self) -> Self {
        self.state.lock().expose_positions = true;
        self
    }

    pub fn without_role_marker(self) -> Self {
        self.state.lock().role_marker = false;
        self
    }

    pub fn recycling_all(self) -> Self {
        self.state.lock().recycle_all = true;
        self
    }

    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn offset(&self) -> f64 {
        self.state.lock().offset
    }

    /// Ids of nodes whose text was read without a label selector, in order.
    pub fn probe_log(&self) -> Vec<u64> {
        self.state.lock().probe_log.clone()
    }

    pub fn scanner(&self) -> FakeScanner {
        FakeScanner { list: self.clone() }
    }

    pub fn surface(&self) -> FakeSurface {
        FakeSurface { list: self.clone() }
    }
}

pub struct FakeNode {
    list: FakeList,
    id: u64,
}

impl FakeNode {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl ListItemHandle for FakeNode {
    async fn text(&self, part: Option<&str>) -> Result<Option<String>, InteractionError> {
        let mut state = self.list.state.lock();
        let row_index = state.node(self.id)?.row;
        let row = state.rows[row_index].clone();
        match part {
            None => {
                state.probe_log.push(self.id);
                let mut text = row.name.clone();
                if let (true, Some(id)) = (row.inline, &row.identifier) {
                    text.push_str(&format!(" @{id}"));
                }
                Ok(Some(text))
            }
            Some(".name") => Ok(Some(row.name)),
            Some(_) => Ok(None),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, InteractionError> {
        let mut state = self.list.state.lock();
        Ok(state.node(self.id)?.attrs.get(name).cloned())
    }

    async fn set_attribute(&self, name: &str, value: &str) -> Result<(), InteractionError> {
        let mut state = self.list.state.lock();
        state
            .node(self.id)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<(), InteractionError> {
        let mut state = self.list.state.lock();
        state.node(self.id).map(|_| ())
    }

    async fn pointer(
        &self,
        _target: Option<&str>,
        event: PointerEvent,
    ) -> Result<(), InteractionError> {
        let mut state = self.list.state.lock();
        state.node(self.id)?;
        match event {
            PointerEvent::Enter => {
                state.hovered = Some(self.id);
                state.polls_since_hover = 0;
            }
            PointerEvent::Leave => state.hovered = None,
        }
        Ok(())
    }

    async fn region_text(&self) -> Result<String, InteractionError> {
        let mut state = self.list.state.lock();
        let row_index = state.node(self.id)?.row;
        state.polls_since_hover += 1;
        let row = &state.rows[row_index];
        let revealed =
            state.hovered == Some(self.id) && state.polls_since_hover >= state.reveal_after;
        match (&row.identifier, revealed) {
            (Some(id), true) => Ok(format!("{} @{}", row.name, id)),
            _ => Ok(row.name.clone()),
        }
    }

    async fn position(&self) -> Result<Option<u64>, InteractionError> {
        let mut state = self.list.state.lock();
        let row = state.node(self.id)?.row as u64;
        Ok(state.expose_positions.then_some(row))
    }
}

pub struct FakeScanner {
    list: FakeList,
}

#[async_trait]
impl ItemScanner for FakeScanner {
    type Item = FakeNode;

    async fn scan(&self) -> Result<Vec<FakeNode>, InteractionError> {
        let state = self.list.state.lock();
        if state.closed {
            return Err(InteractionError::SessionClosed);
        }
        Ok(state
            .mounted
            .iter()
            .map(|(id, _)| FakeNode {
                list: self.list.clone(),
                id: *id,
            })
            .collect())
    }
}

#[derive(Clone)]
pub struct FakeContainer {
    list: FakeList,
    name: &'static str,
}

#[async_trait]
impl ScrollContainer for FakeContainer {
    async fn offset(&self) -> Result<f64, InteractionError> {
        Ok(self.list.state.lock().offset)
    }

    async fn wheel(&self, delta: f64) -> Result<(), InteractionError> {
        let mut state = self.list.state.lock();
        if state.closed {
            return Err(InteractionError::SessionClosed);
        }
        state.offset = (state.offset + delta).clamp(0.0, state.max_offset());
        state.remount();
        Ok(())
    }

    async fn scroll_to(&self, offset: f64) -> Result<(), InteractionError> {
        let mut state = self.list.state.lock();
        if state.closed {
            return Err(InteractionError::SessionClosed);
        }
        state.offset = offset.clamp(0.0, state.max_offset());
        state.remount();
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.to_string()
    }
}

pub struct FakeSurface {
    list: FakeList,
}

#[async_trait]
impl ScrollSurface for FakeSurface {
    type Container = FakeContainer;

    async fn find_container(
        &self,
        query: &ContainerQuery,
    ) -> Result<Option<FakeContainer>, InteractionError> {
        let role_marker = self.list.state.lock().role_marker;
        match query {
            ContainerQuery::Selector(selector) if role_marker && selector == r#"[role="list"]"# => {
                Ok(Some(FakeContainer {
                    list: self.list.clone(),
                    name: "div[role=list]",
                }))
            }
            _ => Ok(None),
        }
    }

    async fn document_scroller(&self) -> Result<FakeContainer, InteractionError> {
        Ok(FakeContainer {
            list: self.list.clone(),
            name: "document",
        })
    }
}
