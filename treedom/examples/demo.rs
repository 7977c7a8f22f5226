use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{Event as CrosstermEvent, KeyCode};
use simplelog::{Config, LevelFilter, WriteLogger};
use treedom::{
    Click, EventKind, LoadToken, ModelEvent, State, Terminal, TreeNode, TreeView, ViewConfig,
};

/// Pending lazy loads: the branch being filled, its completion token and
/// when the simulated fetch started.
type Pending = Rc<RefCell<Vec<(TreeNode, LoadToken, Instant)>>>;

fn main() -> std::io::Result<()> {
    // Set up file logging
    let log_file = File::create("demo.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let model = build_tree();
    let remote = model.at(2).expect("remote branch");

    let tree = TreeView::new(model, ViewConfig::new());
    tree.render();
    tree.on_node_selected(Rc::new(|event| {
        log::info!("selected: {:?}", event.selected.display_text());
    }));

    // Simulate a fetch when the remote branch is first opened
    let pending: Pending = Rc::default();
    {
        let pending = Rc::clone(&pending);
        let branch = remote.clone();
        remote.on(
            EventKind::StateChanged,
            Rc::new(move |event: &ModelEvent| {
                let opened = matches!(
                    event,
                    ModelEvent::StateChanged {
                        state: State::Opened,
                        value: true,
                    }
                );
                if opened && branch.child_count() == 0 && !branch.state(State::Loading) {
                    let pending = Rc::clone(&pending);
                    let branch = branch.clone();
                    branch.clone().load(move |token| {
                        pending.borrow_mut().push((branch, token, Instant::now()));
                    });
                }
            }),
        );
    }

    tree.model().set_state(State::Opened, true);

    let mut term = Terminal::new()?;
    let dom = tree.dom();

    loop {
        let layout = term.render(&dom.borrow(), tree.root_element())?.clone();

        let events = term.poll(Some(Duration::from_millis(100)))?;
        for event in &events {
            match event {
                CrosstermEvent::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                },
                CrosstermEvent::Mouse(mouse) => {
                    if let Some(click) = Click::from_mouse(mouse) {
                        tree.click(&layout, click.x, click.y);
                    }
                }
                _ => {}
            }
        }

        // Complete fetches that have "arrived"
        let due: Vec<_> = {
            let mut pending = pending.borrow_mut();
            let mut due = Vec::new();
            let mut waiting = Vec::new();
            for entry in pending.drain(..) {
                if entry.2.elapsed() >= Duration::from_millis(1200) {
                    due.push(entry);
                } else {
                    waiting.push(entry);
                }
            }
            *pending = waiting;
            due
        };
        for (branch, token, _) in due {
            let fetched = [
                TreeNode::with_text("payload-1.bin").leaf(true),
                TreeNode::with_text("payload-2.bin").leaf(true),
                TreeNode::with_text("manifest.toml").leaf(true),
            ];
            if let Err(err) = branch.add_all(&fetched) {
                log::warn!("could not attach fetched children: {err}");
            }
            token.complete();
        }
    }
}

fn build_tree() -> TreeNode {
    TreeNode::with_text("project")
        .child(
            TreeNode::with_text("src")
                .child(TreeNode::with_text("lib.rs").leaf(true))
                .child(TreeNode::with_text("main.rs").leaf(true)),
        )
        .child(TreeNode::with_text("Cargo.toml").leaf(true))
        .child(TreeNode::with_text("remote (lazy)"))
        .child(TreeNode::with_text("README.md").leaf(true))
}
