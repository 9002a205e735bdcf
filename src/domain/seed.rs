//! Sample content compiled into the site. It is merged under whatever
//! visitors have written when a store is opened.

use super::{Category, CommunityPost, Notice, NoticeType};

fn notice(
    id: i64,
    title: &str,
    content: &str,
    date: &str,
    views: u64,
    likes: u64,
    notice_type: NoticeType,
) -> Notice {
    Notice {
        id,
        title: title.to_string(),
        content: content.to_string(),
        author: "관리자".to_string(),
        date: date.to_string(),
        views,
        likes,
        notice_type,
        is_important: notice_type == NoticeType::Important,
        is_pinned: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    id: i64,
    title: &str,
    content: &str,
    author: &str,
    grade: &str,
    date: &str,
    views: u64,
    likes: u64,
    category: Category,
) -> CommunityPost {
    CommunityPost {
        id,
        title: title.to_string(),
        content: content.to_string(),
        author: author.to_string(),
        grade: grade.to_string(),
        date: date.to_string(),
        views,
        likes,
        category,
        is_pinned: false,
    }
}

pub fn seed_notices() -> Vec<Notice> {
    vec![
        notice(
            1,
            "2024년 정기 총회 개최 안내",
            "12월 15일(일) 오후 2시, 모교 강당에서 정기 총회가 개최됩니다. 많은 참석 부탁드립니다.",
            "2024.11.28",
            156,
            23,
            NoticeType::Important,
        ),
        notice(
            2,
            "장학금 신청 접수 시작",
            "2025년도 장학금 신청을 받습니다. 신청 기간: 12월 1일 ~ 12월 31일",
            "2024.11.25",
            89,
            12,
            NoticeType::General,
        ),
        notice(
            3,
            "동창회 회비 납부 안내",
            "2024년도 동창회 회비 납부를 안내드립니다. 계좌번호: 농협 123-456-789012",
            "2024.11.20",
            234,
            18,
            NoticeType::General,
        ),
        notice(
            4,
            "송년회 개최 안내",
            "12월 25일 송년회를 개최합니다. 장소: 군산 롯데호텔 2층 연회장",
            "2024.11.18",
            178,
            31,
            NoticeType::Event,
        ),
    ]
}

pub fn seed_posts() -> Vec<CommunityPost> {
    vec![
        post(
            1,
            "85학번 동기회 모임 후기",
            "지난 주말 85학번 동기회 모임이 성황리에 마무리되었습니다. 30여 명이 참석해서 즐거운 시간을 보냈습니다.",
            "김○○",
            "85학번",
            "2024.11.27",
            89,
            12,
            Category::ClassReunion,
        ),
        post(
            2,
            "모교 근황 공유합니다",
            "최근 모교를 방문했는데 많은 변화가 있더군요. 새로운 건물도 생기고 운동장도 새롭게 단장되었습니다.",
            "이○○",
            "78학번",
            "2024.11.26",
            156,
            18,
            Category::SchoolNews,
        ),
        post(
            3,
            "동창 사업체 소개",
            "군산에서 카페를 운영하고 있습니다. 동창분들께 할인 혜택을 드리니 언제든 놀러오세요.",
            "박○○",
            "92학번",
            "2024.11.25",
            234,
            25,
            Category::Business,
        ),
        post(
            4,
            "취업 정보 공유",
            "저희 회사에서 신입사원을 모집합니다. 관심 있는 후배들은 연락주세요. 자세한 내용은 개인 메시지로 문의해주세요.",
            "최○○",
            "88학번",
            "2024.11.24",
            312,
            31,
            Category::Jobs,
        ),
    ]
}
