use oiv_core::{
    ColumnLayout, Dataset, DatasetTotals, FilterSelection, GraphScene, InfoPanel, SelectionStore,
    TableController,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::app::panels::{DashboardPanel, StatsSidebar};

/// The selection store and every view registered on it
#[derive(Debug)]
pub struct Views {
    pub store: SelectionStore,
    pub totals: DatasetTotals,
    pub graph: Rc<RefCell<GraphScene>>,
    pub table: Rc<RefCell<TableController>>,
    pub info: Rc<RefCell<InfoPanel>>,
    pub dashboard: Rc<RefCell<DashboardPanel>>,
    pub sidebar: Rc<RefCell<StatsSidebar>>,
}

impl Views {
    pub fn new(
        dataset: Dataset,
        selection: FilterSelection,
        layout: ColumnLayout,
        page_size: usize,
    ) -> Self {
        let dataset = Arc::new(dataset);
        let mut store = SelectionStore::with_selection(Arc::clone(&dataset), selection);

        let mut table = TableController::new(page_size);
        table.set_layout(layout);

        let graph = Rc::new(RefCell::new(GraphScene::new(&dataset)));
        let table = Rc::new(RefCell::new(table));
        let info = Rc::new(RefCell::new(InfoPanel::new(Arc::clone(&dataset))));
        let dashboard = Rc::new(RefCell::new(DashboardPanel::new(Arc::clone(&dataset))));
        let sidebar = Rc::new(RefCell::new(StatsSidebar::default()));

        store.register(&graph);
        store.register(&table);
        store.register(&info);
        store.register(&dashboard);
        store.register(&sidebar);

        Self {
            totals: DatasetTotals::of(&dataset),
            store,
            graph,
            table,
            info,
            dashboard,
            sidebar,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        self.store.dataset()
    }
}
