//! See [`EditingSession`].

use std::sync::Arc;

use fieldedit_types::{Coordinate, Srid};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::async_runtime;
use crate::config::EditingConfig;
use crate::control::{EventPropagation, PointerEvent};
use crate::error::EditError;
use crate::feature::Feature;
use crate::geometry::{GeoEngine, GeometryEngine};
use crate::group::{
    GroupContext, GroupKind, GroupResponse, PaletteButton, PaletteEntry, SelectionGroup, ToolGroup,
};
use crate::layer::{EditableLayer, ProjectionEngine, SpatialEngine, VectorLayer};
use crate::messenger::{LogMessenger, Messenger};
use crate::overlay::OverlayShape;
use crate::query::{CancelFlag, SpatialQuery};
use crate::task::{Completion, CutExtendPair, Progress, Task, TaskContext};
use crate::tool::ToolKind;
use crate::view::MapView;

/// Editing state of one map.
///
/// The session owns the active [`ToolGroup`] and routes palette presses, pointer events and GPS
/// fixes to it. Queries and commits run as background tasks on the tokio runtime; their results
/// are applied when the host calls [`EditingSession::process_completions`] or awaits
/// [`EditingSession::next_completion`] on the interaction thread.
///
/// Only one task runs at a time. While it runs, the session is busy and rejects new input.
pub struct EditingSession {
    env: Environment,
    group: ToolGroup,
    messenger: Arc<dyn Messenger>,
    generation: u64,
    in_flight: Option<(Progress, CancelFlag)>,
    outstanding: usize,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    info_result: Option<Vec<Feature>>,
}

/// Everything a tool group may read, kept apart from the group so that both can be borrowed at
/// the same time.
struct Environment {
    config: EditingConfig,
    view: MapView,
    layers: Vec<Arc<dyn VectorLayer>>,
    edit_layer: Option<Arc<dyn EditableLayer>>,
    geometry: Arc<dyn GeometryEngine>,
    spatial: Arc<dyn SpatialEngine>,
    gps_fix: Option<Coordinate>,
}

impl Environment {
    fn group_context(&self) -> GroupContext<'_> {
        GroupContext {
            view: &self.view,
            config: &self.config,
            edit_layer: self.edit_layer.as_ref(),
            layers: &self.layers,
            geometry: self.geometry.as_ref(),
            gps_fix: self.gps_fix,
        }
    }
}

impl EditingSession {
    /// Creates a session without layers. The view is expected to be in the display reference
    /// system of the configuration.
    pub fn new(config: EditingConfig, view: MapView) -> Self {
        if view.srid() != config.display_srid() {
            log::warn!(
                "View reference system {} differs from the display reference system {}",
                view.srid(),
                config.display_srid()
            );
        }

        let (sender, receiver) = unbounded_channel();
        Self {
            env: Environment {
                geometry: Arc::new(GeoEngine::new(config.split_precision())),
                spatial: Arc::new(ProjectionEngine),
                config,
                view,
                layers: vec![],
                edit_layer: None,
                gps_fix: None,
            },
            group: ToolGroup::for_edit_layer(None),
            messenger: Arc::new(LogMessenger),
            generation: 0,
            in_flight: None,
            outstanding: 0,
            sender,
            receiver,
            info_result: None,
        }
    }

    /// Sets the receiver of redraw requests and notices.
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = messenger;
        self
    }

    /// Sets the layers that are visible on the map. Info queries run over the enabled ones.
    pub fn with_layers(mut self, layers: Vec<Arc<dyn VectorLayer>>) -> Self {
        self.env.layers = layers;
        self
    }

    /// Sets the layer being edited.
    pub fn with_edit_layer(mut self, layer: Arc<dyn EditableLayer>) -> Self {
        self.set_edit_layer(Some(layer));
        self
    }

    /// Replaces the geometry engine.
    pub fn with_geometry_engine(mut self, engine: Arc<dyn GeometryEngine>) -> Self {
        self.env.geometry = engine;
        self
    }

    /// Replaces the engine used to reproject query envelopes.
    pub fn with_spatial_engine(mut self, engine: Arc<dyn SpatialEngine>) -> Self {
        self.env.spatial = engine;
        self
    }

    /// Configuration of the session.
    pub fn config(&self) -> &EditingConfig {
        &self.env.config
    }

    /// Current map view.
    pub fn view(&self) -> &MapView {
        &self.env.view
    }

    /// Updates the map view after the host panned or zoomed the map.
    pub fn set_view(&mut self, view: MapView) {
        self.env.view = view;
        self.messenger.request_redraw();
    }

    /// Visible layers.
    pub fn layers(&self) -> &[Arc<dyn VectorLayer>] {
        &self.env.layers
    }

    /// Replaces the visible layers.
    pub fn set_layers(&mut self, layers: Vec<Arc<dyn VectorLayer>>) {
        self.env.layers = layers;
    }

    /// Layer being edited.
    pub fn edit_layer(&self) -> Option<&Arc<dyn EditableLayer>> {
        self.env.edit_layer.as_ref()
    }

    /// Changes the layer being edited.
    ///
    /// The active group is replaced with the main palette of the new layer, or with the
    /// info-only group if there is no editable layer. A running task is cancelled and its result
    /// is discarded.
    pub fn set_edit_layer(&mut self, layer: Option<Arc<dyn EditableLayer>>) {
        match &layer {
            Some(layer) => log::info!("Editing layer {}", layer.name()),
            None => log::info!("No layer is editable"),
        }

        if let Some((_, cancel)) = self.in_flight.take() {
            cancel.cancel();
        }

        self.env.edit_layer = layer;
        let group = ToolGroup::for_edit_layer(self.env.edit_layer.as_ref());
        self.switch_group(group);
        self.messenger.request_redraw();
    }

    /// Kind of the active group.
    pub fn group_kind(&self) -> GroupKind {
        self.group.kind()
    }

    /// Active group.
    pub fn group(&self) -> &ToolGroup {
        &self.group
    }

    /// Kind of the active tool, if any.
    pub fn active_tool_kind(&self) -> Option<ToolKind> {
        self.group.active_tool().map(|tool| tool.kind())
    }

    /// Buttons to show.
    pub fn palette(&self) -> Vec<PaletteEntry> {
        self.group.palette()
    }

    /// Returns false while an editing gesture needs the pointer, so the map must not pan.
    pub fn map_interaction_enabled(&self) -> bool {
        self.group.map_interaction_enabled()
    }

    /// Shapes to draw over the map.
    pub fn overlay(&self) -> Vec<OverlayShape> {
        self.group.overlay(&self.env.view)
    }

    /// Features found by the last info query.
    pub fn info_result(&self) -> Option<&[Feature]> {
        self.info_result.as_deref()
    }

    /// Takes the features found by the last info query.
    pub fn take_info_result(&mut self) -> Option<Vec<Feature>> {
        self.info_result.take()
    }

    /// Vertices of the feature being created, in display coordinates.
    pub fn pending_vertices(&self) -> &[Coordinate] {
        match &self.group {
            ToolGroup::CreateFeature(group) => group.vertices(),
            _ => &[],
        }
    }

    /// Current selection.
    pub fn selection(&self) -> Option<&SelectionGroup> {
        match &self.group {
            ToolGroup::Selection(group) => Some(group),
            _ => None,
        }
    }

    /// Replaces the selected features. Does nothing outside of a selection group.
    pub fn set_selected_features(&mut self, features: Vec<Feature>) {
        if let ToolGroup::Selection(group) = &mut self.group {
            group.set_selected_features(features);
            self.messenger.request_redraw();
        }
    }

    /// Result of the last cut/extend gesture waiting for commit.
    pub fn cut_extend_pair(&self) -> Option<&CutExtendPair> {
        match &self.group {
            ToolGroup::MainEditing(group) => group.pair(),
            _ => None,
        }
    }

    /// Last GPS fix in display coordinates.
    pub fn gps_fix(&self) -> Option<Coordinate> {
        self.env.gps_fix
    }

    /// Returns true while a background task runs.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Description of the running task.
    pub fn progress(&self) -> Option<&Progress> {
        self.in_flight.as_ref().map(|(progress, _)| progress)
    }

    /// Requests cancellation of the running task. Only queries can be cancelled.
    ///
    /// Returns true if the request was sent.
    pub fn cancel_progress(&self) -> bool {
        match &self.in_flight {
            Some((progress, cancel)) if progress.cancellable => {
                log::debug!("Cancelling {}", progress.title);
                cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Handles a palette button press.
    ///
    /// Returns [`EditError::Busy`] without doing anything if a task is running.
    pub fn press(&mut self, button: PaletteButton) -> Result<(), EditError> {
        self.check_not_busy(button)?;
        let response = self.group.press(button, &self.env.group_context());
        self.apply_response(response);
        Ok(())
    }

    /// Handles a long press of a palette button.
    ///
    /// Returns [`EditError::Busy`] without doing anything if a task is running.
    pub fn long_press(&mut self, button: PaletteButton) -> Result<(), EditError> {
        self.check_not_busy(button)?;
        let response = self.group.long_press(button, &self.env.group_context());
        self.apply_response(response);
        Ok(())
    }

    fn check_not_busy(&self, button: PaletteButton) -> Result<(), EditError> {
        match &self.in_flight {
            Some((progress, _)) => {
                log::debug!("{button:?} rejected, {} is in progress", progress.title);
                Err(EditError::Busy)
            }
            None => Ok(()),
        }
    }

    /// Handles a pointer event on the map.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventPropagation {
        if self.in_flight.is_some() {
            log::debug!("Pointer event rejected while a task is in progress");
            return if self.group.map_interaction_enabled() {
                EventPropagation::Propagate
            } else {
                EventPropagation::Consume
            };
        }

        let (propagation, response) = self
            .group
            .handle_pointer(&event, &self.env.group_context());
        self.apply_response(response);
        propagation
    }

    /// Stores a new GPS fix given in WGS84 longitude and latitude.
    pub fn gps_update(&mut self, lon: f64, lat: f64) {
        let wgs84 = Coordinate { x: lon, y: lat };
        let fix = match Srid::WGS84.transform(wgs84, self.env.config.display_srid()) {
            Ok(fix) => fix,
            Err(err) => {
                log::warn!("Ignoring GPS fix ({lon}, {lat}): {err}");
                return;
            }
        };

        self.env.gps_fix = Some(fix);
        if self.in_flight.is_some() {
            return;
        }

        let response = self.group.gps_update(fix, &self.env.group_context());
        self.apply_response(response);
    }

    /// Applies all results of finished tasks. Returns the number of applied results.
    pub fn process_completions(&mut self) -> usize {
        let mut count = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            if self.complete(completion) {
                count += 1;
            }
        }

        count
    }

    /// Waits for the next task to finish and applies its result.
    ///
    /// Returns false without waiting if no task is running. A result of a task started by a
    /// group that was replaced since is discarded.
    pub async fn next_completion(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }

        match self.receiver.recv().await {
            Some(completion) => {
                self.complete(completion);
                true
            }
            None => false,
        }
    }

    fn complete(&mut self, completion: Completion) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        if completion.generation != self.generation {
            log::debug!(
                "Dropping stale result of generation {} (current {}): {:?}",
                completion.generation,
                self.generation,
                completion.outcome
            );
            return false;
        }

        if let Some((progress, _)) = self.in_flight.take() {
            log::trace!("{} finished", progress.title);
        }

        let response = self
            .group
            .on_outcome(completion.outcome, &self.env.group_context());
        self.apply_response(response);
        true
    }

    fn apply_response(&mut self, response: GroupResponse) {
        let GroupResponse {
            redraw,
            switch_to,
            task,
            notices,
            info,
        } = response;

        if let Some(task) = task {
            self.start(task);
        }

        if let Some(group) = switch_to {
            self.switch_group(group);
        }

        if let Some(features) = info {
            self.info_result = Some(features);
        }

        for notice in notices {
            self.messenger.notify(notice);
        }

        if redraw {
            self.messenger.request_redraw();
        }
    }

    fn switch_group(&mut self, group: ToolGroup) {
        log::debug!("Switching from {:?} to {:?}", self.group.kind(), group.kind());
        self.group = group;
        self.generation += 1;
    }

    fn start(&mut self, task: Task) {
        let progress = task.progress();
        let cancel = CancelFlag::new();
        let display_srid = self.env.config.display_srid();
        let context = TaskContext {
            query: SpatialQuery::new(self.env.spatial.clone(), display_srid, cancel.clone()),
            geometry: self.env.geometry.clone(),
            spatial: self.env.spatial.clone(),
            display_srid,
        };

        log::debug!("Starting {}: {}", progress.title, progress.message);

        let generation = self.generation;
        let sender = self.sender.clone();
        let failure = task.failure();
        let title = progress.title.clone();
        let handle = async_runtime::spawn(task.run(context));
        async_runtime::spawn(async move {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    log::error!("{title} failed: {err}");
                    failure(EditError::TaskFailed(err.to_string()))
                }
            };
            if sender.send(Completion { generation, outcome }).is_err() {
                log::debug!("Session was dropped before the task finished");
            }
        });

        self.in_flight = Some((progress, cancel));
        self.outstanding += 1;
    }
}
