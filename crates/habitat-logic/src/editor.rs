//! Layout editing: the mutations a front end applies to a [`LayoutState`].
//!
//! Each operation either applies completely or returns an [`EditError`]
//! and leaves the state untouched. Coordinates are already in meters on
//! the global plane; pointer and viewport handling stay in the front end.
//!
//! Editing does not enforce the layout rules. A layout may pass through
//! invalid states while the user works; [`crate::validation`] reports them.

use crate::catalog::{find_main_module_type, find_sub_module_type};
use crate::config::ValidationConfig;
use crate::geometry::{main_module_rect, snap_to_grid};
use crate::layout::{Connection, LayoutState, PlacedMainModule, PlacedSubModule};
use thiserror::Error;

/// Why an edit was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("unknown main module type '{0}'")]
    UnknownMainModuleType(String),
    #[error("unknown sub-module type '{0}'")]
    UnknownSubModuleType(String),
    #[error("no main module with instance id '{0}'")]
    MainModuleNotFound(String),
    #[error("no sub-module with instance id '{0}'")]
    SubModuleNotFound(String),
    #[error("no connection with id '{0}'")]
    ConnectionNotFound(String),
    #[error("module '{module_id}' has no port '{port_id}'")]
    PortNotFound { module_id: String, port_id: String },
    #[error("sub-modules must be placed inside a main module (dropped at {x:.2}, {y:.2})")]
    NoParentAtPoint { x: f32, y: f32 },
    #[error("{sub} cannot be placed in {parent}")]
    NotAllowedIn { sub: String, parent: String },
    #[error("a module cannot connect to itself ('{0}')")]
    SelfConnection(String),
    #[error("port '{port_id}' on '{module_id}' is already connected")]
    PortInUse { module_id: String, port_id: String },
    #[error("'{module_id}' already has its maximum of {max} connections")]
    MaxConnectionsReached { module_id: String, max: u32 },
    #[error("crew size must be at least 1")]
    InvalidCrewSize,
    #[error("elevation must not be negative (got {0})")]
    NegativeElevation(f32),
}

impl LayoutState {
    fn mint_instance_id(&mut self, type_id: &str) -> String {
        self.next_instance += 1;
        format!("{}-{}", type_id, self.next_instance)
    }

    fn main_index(&self, instance_id: &str) -> Result<usize, EditError> {
        self.main_modules
            .iter()
            .position(|m| m.instance_id == instance_id)
            .ok_or_else(|| EditError::MainModuleNotFound(instance_id.to_string()))
    }

    fn sub_index(&self, instance_id: &str) -> Result<usize, EditError> {
        self.sub_modules
            .iter()
            .position(|s| s.instance_id == instance_id)
            .ok_or_else(|| EditError::SubModuleNotFound(instance_id.to_string()))
    }

    // ── Crew ────────────────────────────────────────────────────────────

    pub fn set_crew_size(&mut self, crew_size: u32) -> Result<(), EditError> {
        if crew_size == 0 {
            log::warn!("Rejected crew size 0");
            return Err(EditError::InvalidCrewSize);
        }
        self.crew_size = crew_size;
        log::info!("Crew size set to {}", crew_size);
        Ok(())
    }

    // ── Placement ───────────────────────────────────────────────────────

    /// Place a main module with its top-left corner at the grid point
    /// nearest (x, y). Returns the new instance id.
    pub fn place_main_module(&mut self, type_id: &str, x: f32, y: f32) -> Result<String, EditError> {
        self.place_main_module_with(type_id, x, y, &ValidationConfig::default())
    }

    pub fn place_main_module_with(
        &mut self,
        type_id: &str,
        x: f32,
        y: f32,
        config: &ValidationConfig,
    ) -> Result<String, EditError> {
        let Some(kind) = find_main_module_type(type_id) else {
            log::warn!("Rejected placement of unknown main module type '{}'", type_id);
            return Err(EditError::UnknownMainModuleType(type_id.to_string()));
        };
        let instance_id = self.mint_instance_id(type_id);
        let x = snap_to_grid(x, config.grid_size);
        let y = snap_to_grid(y, config.grid_size);
        self.main_modules
            .push(PlacedMainModule::new(instance_id.clone(), kind, x, y));
        log::info!("Added {} at ({}, {}) as {}", kind.short_name, x, y, instance_id);
        Ok(instance_id)
    }

    /// Drop a sub-module at a global point. The parent is the first main
    /// module whose rotated footprint contains the point; the stored
    /// position is relative to that parent.
    pub fn place_sub_module(&mut self, type_id: &str, x: f32, y: f32) -> Result<String, EditError> {
        let Some(kind) = find_sub_module_type(type_id) else {
            log::warn!("Rejected placement of unknown sub-module type '{}'", type_id);
            return Err(EditError::UnknownSubModuleType(type_id.to_string()));
        };

        let Some(parent) = self
            .main_modules
            .iter()
            .find(|m| main_module_rect(m).contains_point(x, y))
        else {
            log::warn!("{} dropped outside every main module", kind.short_name);
            return Err(EditError::NoParentAtPoint { x, y });
        };

        if !parent.kind.allows(&kind.id) {
            log::warn!(
                "{} cannot be placed in {}",
                kind.short_name,
                parent.kind.short_name
            );
            return Err(EditError::NotAllowedIn {
                sub: kind.short_name.clone(),
                parent: parent.kind.short_name.clone(),
            });
        }

        let parent_id = parent.instance_id.clone();
        let parent_name = parent.kind.short_name.clone();
        let (rel_x, rel_y) = (x - parent.x, y - parent.y);

        let instance_id = self.mint_instance_id(type_id);
        self.sub_modules.push(PlacedSubModule::new(
            instance_id.clone(),
            parent_id,
            kind,
            rel_x,
            rel_y,
        ));
        log::info!("Added {} to {} as {}", kind.short_name, parent_name, instance_id);
        Ok(instance_id)
    }

    // ── Move / rotate ───────────────────────────────────────────────────

    /// Move a main module to the grid point nearest (x, y). Its
    /// sub-modules travel with it.
    pub fn move_main_module(&mut self, instance_id: &str, x: f32, y: f32) -> Result<(), EditError> {
        self.move_main_module_with(instance_id, x, y, &ValidationConfig::default())
    }

    pub fn move_main_module_with(
        &mut self,
        instance_id: &str,
        x: f32,
        y: f32,
        config: &ValidationConfig,
    ) -> Result<(), EditError> {
        let idx = self.main_index(instance_id)?;
        let module = &mut self.main_modules[idx];
        module.x = snap_to_grid(x, config.grid_size);
        module.y = snap_to_grid(y, config.grid_size);
        log::info!("Moved {} to ({}, {})", instance_id, module.x, module.y);
        Ok(())
    }

    /// Move a sub-module within its parent. Coordinates are parent-relative
    /// and not snapped.
    pub fn move_sub_module(&mut self, instance_id: &str, x: f32, y: f32) -> Result<(), EditError> {
        let idx = self.sub_index(instance_id)?;
        let parent_id = &self.sub_modules[idx].parent_instance_id;
        if self.main_module(parent_id).is_none() {
            log::warn!("Cannot move {}: parent {} is gone", instance_id, parent_id);
            return Err(EditError::MainModuleNotFound(parent_id.clone()));
        }
        let sub = &mut self.sub_modules[idx];
        sub.x = x;
        sub.y = y;
        log::info!("Moved {} to ({}, {}) in its parent", instance_id, x, y);
        Ok(())
    }

    /// Set a sub-module's base height above its parent's floor.
    pub fn set_sub_module_z(&mut self, instance_id: &str, z: f32) -> Result<(), EditError> {
        if z < 0.0 || z.is_nan() {
            return Err(EditError::NegativeElevation(z));
        }
        let idx = self.sub_index(instance_id)?;
        self.sub_modules[idx].z = z;
        log::info!("Raised {} to z={}", instance_id, z);
        Ok(())
    }

    /// Rotate a main module 90° clockwise.
    pub fn rotate_main_module(&mut self, instance_id: &str) -> Result<(), EditError> {
        let idx = self.main_index(instance_id)?;
        let module = &mut self.main_modules[idx];
        module.rotation = module.rotation.next();
        log::info!("Rotated {} to {}", instance_id, module.rotation);
        Ok(())
    }

    // ── Delete ──────────────────────────────────────────────────────────

    /// Remove a main module together with its sub-modules and every
    /// connection that touches it.
    pub fn delete_main_module(&mut self, instance_id: &str) -> Result<(), EditError> {
        let idx = self.main_index(instance_id)?;
        let removed = self.main_modules.remove(idx);

        let subs_before = self.sub_modules.len();
        self.sub_modules
            .retain(|s| s.parent_instance_id != instance_id);
        let conns_before = self.connections.len();
        self.connections.retain(|c| !c.touches(instance_id));

        if self.selected_main_module_id.as_deref() == Some(instance_id) {
            self.selected_main_module_id = None;
        }
        if let Some(sel) = self.selected_sub_module_id.as_deref() {
            if self.sub_module(sel).is_none() {
                self.selected_sub_module_id = None;
            }
        }

        log::info!(
            "{} and its sub-modules deleted ({} sub-modules, {} connections)",
            removed.kind.short_name,
            subs_before - self.sub_modules.len(),
            conns_before - self.connections.len()
        );
        Ok(())
    }

    /// Remove a single sub-module.
    pub fn delete_sub_module(&mut self, instance_id: &str) -> Result<(), EditError> {
        let idx = self.sub_index(instance_id)?;
        let removed = self.sub_modules.remove(idx);
        if self.selected_sub_module_id.as_deref() == Some(instance_id) {
            self.selected_sub_module_id = None;
        }
        log::info!("{} deleted", removed.kind.short_name);
        Ok(())
    }

    // ── Connections ─────────────────────────────────────────────────────

    /// Dock two main modules port to port. Returns the connection id.
    ///
    /// Port-type compatibility is left to validation; structural limits
    /// (existing ports, free ports, connection caps) are enforced here.
    pub fn connect(
        &mut self,
        from_module_id: &str,
        from_port_id: &str,
        to_module_id: &str,
        to_port_id: &str,
    ) -> Result<String, EditError> {
        if from_module_id == to_module_id {
            return Err(EditError::SelfConnection(from_module_id.to_string()));
        }

        for (module_id, port_id) in [(from_module_id, from_port_id), (to_module_id, to_port_id)] {
            let module = self
                .main_module(module_id)
                .ok_or_else(|| EditError::MainModuleNotFound(module_id.to_string()))?;
            if module.port(port_id).is_none() {
                return Err(EditError::PortNotFound {
                    module_id: module_id.to_string(),
                    port_id: port_id.to_string(),
                });
            }
            if self.connections.iter().any(|c| c.uses_port(module_id, port_id)) {
                log::warn!("Port {} on {} is already connected", port_id, module_id);
                return Err(EditError::PortInUse {
                    module_id: module_id.to_string(),
                    port_id: port_id.to_string(),
                });
            }
            if let Some(max) = module.kind.max_connections {
                if self.connections_of(module_id).count() as u32 >= max {
                    log::warn!("{} already has {} connections", module_id, max);
                    return Err(EditError::MaxConnectionsReached {
                        module_id: module_id.to_string(),
                        max,
                    });
                }
            }
        }

        let id = self.mint_instance_id("conn");
        self.connections.push(Connection {
            id: id.clone(),
            from_module_id: from_module_id.to_string(),
            from_port_id: from_port_id.to_string(),
            to_module_id: to_module_id.to_string(),
            to_port_id: to_port_id.to_string(),
        });
        log::info!(
            "Connected {}:{} to {}:{} as {}",
            from_module_id,
            from_port_id,
            to_module_id,
            to_port_id,
            id
        );
        Ok(id)
    }

    pub fn disconnect(&mut self, connection_id: &str) -> Result<(), EditError> {
        let idx = self
            .connections
            .iter()
            .position(|c| c.id == connection_id)
            .ok_or_else(|| EditError::ConnectionNotFound(connection_id.to_string()))?;
        self.connections.remove(idx);
        log::info!("Removed connection {}", connection_id);
        Ok(())
    }

    // ── Selection ───────────────────────────────────────────────────────

    /// Select a main module. Clears any sub-module selection.
    pub fn select_main_module(&mut self, instance_id: &str) -> Result<(), EditError> {
        self.main_index(instance_id)?;
        self.selected_main_module_id = Some(instance_id.to_string());
        self.selected_sub_module_id = None;
        Ok(())
    }

    /// Select a sub-module. Clears any main-module selection.
    pub fn select_sub_module(&mut self, instance_id: &str) -> Result<(), EditError> {
        self.sub_index(instance_id)?;
        self.selected_sub_module_id = Some(instance_id.to_string());
        self.selected_main_module_id = None;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_main_module_id = None;
        self.selected_sub_module_id = None;
    }

    /// Rotate the selected main module. A selected sub-module (or nothing)
    /// is left alone; returns whether anything turned.
    pub fn rotate_selected(&mut self) -> Result<bool, EditError> {
        match self.selected_main_module_id.clone() {
            Some(id) => self.rotate_main_module(&id).map(|_| true),
            None => Ok(false),
        }
    }

    /// Delete whatever is selected. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> Result<bool, EditError> {
        if let Some(id) = self.selected_main_module_id.clone() {
            self.delete_main_module(&id)?;
            self.selected_main_module_id = None;
            return Ok(true);
        }
        if let Some(id) = self.selected_sub_module_id.clone() {
            self.delete_sub_module(&id)?;
            self.selected_sub_module_id = None;
            return Ok(true);
        }
        Ok(false)
    }
}
