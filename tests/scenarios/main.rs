/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::rc::Rc;

use keyboard_types::{Key, NamedKey};
use paws::input::KeyInput;
use paws::shell::host::PageDom;
use paws::shell::runtime::diagnostics::{
    CHANNEL_COMMAND_UNRESOLVED, CHANNEL_FOCUS_SELECTOR_MISSING,
};
use paws::shell::ui::picker_view::{PICKER_INPUT_ID, PICKER_ROOT_ID, ROW_CLASS};
use paws::test_utils::FakePage;
use paws::{App, PawsConfig, VERSION};

const EC2_URL: &str =
    "https://us-east-1.console.aws.amazon.com/ec2/v2/home?region=us-east-1#Instances:";

struct Session {
    page: Rc<FakePage>,
    app: App<FakePage, FakePage>,
    clock_ms: u64,
}

impl Session {
    fn start(url: &str) -> Self {
        Self::with_config(url, PawsConfig::default())
    }

    fn with_config(url: &str, config: PawsConfig) -> Self {
        let page = Rc::new(FakePage::new(url));
        let app = App::new(page.clone(), page.clone(), config);
        Self {
            page,
            app,
            clock_ms: 0,
        }
    }

    fn press(&mut self, key: Key) -> bool {
        self.clock_ms += 40;
        self.app.handle_key(&KeyInput::new(key, self.clock_ms))
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(Key::Character(c.to_string()));
        }
    }

    fn idle(&mut self, ms: u64) {
        self.clock_ms += ms;
        self.app.handle_sequence_timeout(self.clock_ms);
    }
}

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn service_shortcuts_navigate() {
    let mut session = Session::start(EC2_URL);
    session.type_text("iam");
    session.idle(2000);
    session.type_text("cfn");

    assert_eq!(
        session.page.navigations(),
        vec!["/iam/home#home".to_string(), "/cloudformation/home".to_string()]
    );
}

#[test]
fn rds_waits_out_the_region_picker_prefix() {
    let mut session = Session::start(EC2_URL);
    session.type_text("rds");

    assert_eq!(session.page.navigations(), vec!["/rds/home#dbinstances:".to_string()]);
    assert!(!session.app.picker_is_open());
}

#[test]
fn cycling_console_links_with_j_k_and_enter() {
    let mut session = Session::start(EC2_URL);
    let anchors: Vec<_> = (0..3).map(|_| session.page.add_anchor("gwt-Anchor")).collect();

    session.type_text("j");
    session.type_text("j");
    session.type_text("k");
    session.type_text("k");
    session.type_text("k");
    assert_eq!(session.page.focused(), Some(anchors[0]));

    session.type_text("j");
    session.press(Key::Named(NamedKey::Enter));
    assert_eq!(session.page.clicks(), vec![anchors[1]]);

    session.press(Key::Named(NamedKey::Escape));
    assert_eq!(session.app.navigator().borrow_mut().current(), None);
}

#[test]
fn region_picker_switches_region() {
    let mut session = Session::start(EC2_URL);
    session.type_text("r");
    session.idle(1500);
    assert!(session.app.picker_is_open());
    assert_eq!(
        session.page.query_all(&format!(".{ROW_CLASS}")).len(),
        session.app.picker().borrow().catalog().len()
    );

    let input = session
        .page
        .query_first(&format!("#{PICKER_INPUT_ID}"))
        .expect("picker input is mounted");
    session.page.type_into(input, "frankfurt");
    session.app.picker_input_changed();
    assert_eq!(session.page.query_all(&format!(".{ROW_CLASS}")).len(), 1);

    assert!(session.press(Key::Named(NamedKey::Enter)));
    assert_eq!(
        session.page.navigations(),
        vec![
            "https://eu-central-1.console.aws.amazon.com/ec2/v2/home?region=eu-central-1#Instances:"
                .to_string()
        ]
    );
    assert!(!session.app.picker_is_open());
    assert!(session.page.query_first(&format!("#{PICKER_ROOT_ID}")).is_none());
}

#[test]
fn empty_picker_commit_stays_open() {
    let mut session = Session::start(EC2_URL);
    session.type_text("r");
    session.idle(1500);

    session.app.picker().borrow_mut().set_query("xyz123notfound");
    session.press(Key::Named(NamedKey::Enter));

    assert!(session.app.picker_is_open());
    assert!(session.page.navigations().is_empty());

    session.press(Key::Named(NamedKey::Escape));
    assert!(!session.app.picker_is_open());
    session.app.picker().borrow_mut().cancel();
    session.app.picker().borrow_mut().close();
    assert!(!session.app.picker_is_open());
}

#[test]
fn clicking_a_picker_row_commits_it() {
    let mut session = Session::start(
        "https://us-east-1.console.aws.amazon.com/cloudwatch/home?region=us-east-1#logsV2:log-groups;region=us-east-1",
    );
    session.type_text("r");
    session.idle(1500);

    session.app.picker_row_clicked("ap-southeast-2");
    assert_eq!(
        session.page.navigations(),
        vec![
            "https://ap-southeast-2.console.aws.amazon.com/cloudwatch/home?region=ap-southeast-2#logsV2:log-groups;region=ap-southeast-2"
                .to_string()
        ]
    );
}

#[test]
fn load_balancer_shortcut_uses_session_region() {
    let mut session = Session::start("https://console.aws.amazon.com/console/home");
    session.type_text("alb");
    assert!(session.page.navigations().is_empty());
    assert_eq!(
        session.app.diagnostics().count(CHANNEL_COMMAND_UNRESOLVED),
        1
    );

    let meta = session.page.add_element("meta", &[], None);
    session.page.set_attribute_on(meta, "name", "awsc-session-data");
    session
        .page
        .set_attribute_on(meta, "content", r#"{"infrastructureRegion":"eu-west-3"}"#);
    session.idle(2000);
    session.type_text("alb");

    assert_eq!(
        session.page.navigations(),
        vec![
            "https://eu-west-3.console.aws.amazon.com/ec2/home?region=eu-west-3#LoadBalancers:v=3"
                .to_string()
        ]
    );
}

#[test]
fn focus_shortcut_reports_missing_search_box() {
    let mut session = Session::start(EC2_URL);
    session.type_text("lam");
    assert_eq!(
        session.app.diagnostics().count(CHANNEL_FOCUS_SELECTOR_MISSING),
        1
    );

    let search = session.page.add_element("input", &["gwt-TextBox"], None);
    session.type_text("/");
    assert_eq!(session.page.focused(), Some(search));
}

#[test]
fn help_opens_in_new_context() {
    let mut session = Session::start(EC2_URL);
    session.type_text("?");
    assert_eq!(
        session.page.opened(),
        vec!["https://github.com/xargsuk/paws#shortcuts".to_string()]
    );
    assert!(session.page.navigations().is_empty());
}

#[test]
fn user_config_rebinds_and_adds_commands() {
    let config = PawsConfig::from_toml_str(
        r#"
        anchor_selector = "a.nav-link"

        [[commands]]
        keys = "s3"
        href = "/s3/buckets?region=us-east-1"

        [[commands]]
        keys = "g g"
        invoke = "anchors_next"
        "#,
    )
    .expect("valid config");
    let mut session = Session::with_config(EC2_URL, config);
    let link = session.page.add_element("a", &["nav-link"], None);

    session.type_text("s3");
    session.idle(2000);
    session.type_text("gg");

    assert_eq!(
        session.page.navigations(),
        vec!["/s3/buckets?region=us-east-1".to_string()]
    );
    assert_eq!(session.page.focused(), Some(link));
}

#[test]
fn idle_operations_are_no_ops() {
    let mut session = Session::start(EC2_URL);
    session.app.navigator().borrow_mut().clear();
    session.app.picker().borrow_mut().close();
    session.app.picker().borrow_mut().cancel();
    session.idle(5000);

    assert!(session.page.navigations().is_empty());
    assert!(session.page.clicks().is_empty());
    assert!(!session.app.picker_is_open());
}
