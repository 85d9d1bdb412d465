use mogu_shared::Category;

/// Items posted for group purchase, with their category.
pub const CATALOG: [(&str, Category); 54] = [
    ("코스트코 소불고기 (4kg)", Category::Food),
    ("신라면 40개입 1박스", Category::Food),
    ("제주 삼다수 2L 12병", Category::Food),
    ("하림 냉동 닭가슴살 2kg", Category::Food),
    ("비비고 왕교자 1.5kg x 2개", Category::Food),
    ("햇반 24개입 1박스", Category::Food),
    ("커클랜드 아몬드 1.13kg", Category::Food),
    ("필라델피아 크림치즈 1.36kg", Category::Food),
    ("상하목장 유기농우유 24팩", Category::Food),
    ("네스프레소 호환캡슐 100개입", Category::Food),
    ("곰표 밀가루 10kg", Category::Food),
    ("스팸 클래식 8개 묶음", Category::Food),
    ("서울우유 체다치즈 100매", Category::Food),
    ("매일 바이오 플레인 요거트 24개", Category::Food),
    ("오뚜기 3분카레 10개입", Category::Food),
    ("크리넥스 3겹 화장지 30롤", Category::Household),
    ("베베숲 물티슈 캡형 10팩", Category::Household),
    ("다우니 섬유유연제 4L 리필", Category::Household),
    ("하기스 매직컴포트 4단계 1박스", Category::Household),
    ("로얄캐닌 강아지사료 8kg", Category::Household),
    ("리스테린 1L x 2개", Category::Household),
    ("페브리즈 1L 리필 x 2개", Category::Household),
    ("종량제봉투 100L 100매", Category::Household),
    ("듀라셀 건전지 AA 40개입", Category::Household),
    ("질레트 퓨전 면도날 8개입", Category::Household),
    ("코디 키친타올 12롤", Category::Household),
    ("지퍼락 냉동용 대형 50매", Category::Household),
    ("깨끗한나라 순수 200매 10개입", Category::Household),
    ("퍼실 세탁세제 3L", Category::Household),
    ("캣츠랑 고양이사료 10kg", Category::Household),
    ("나이키 스포츠 양말 6족 세트", Category::Fashion),
    ("유니클로 에어리즘 3팩", Category::Fashion),
    ("무신사 스탠다드 기본티 5장", Category::Fashion),
    ("크록스 지비츠 세트 (20개입)", Category::Fashion),
    ("캘빈클라인 드로즈 3팩", Category::Fashion),
    ("피카소 칫솔 20개입", Category::Fashion),
    ("컨버스 척 70 클래식", Category::Fashion),
    ("잔스포츠 백팩", Category::Fashion),
    ("샤오미 미밴드 스트랩 5종", Category::Fashion),
    ("카카오프렌즈 볼펜 10자루 세트", Category::Fashion),
    ("다이소 네트망 5개", Category::Fashion),
    ("겨울용 수면양말 10족", Category::Fashion),
    ("닥터지 선크림 1+1 기획세트", Category::Beauty),
    ("고려은단 비타민C 300정", Category::Beauty),
    ("KF94 마스크 200매 박스", Category::Beauty),
    ("메디힐 마스크팩 30매 박스", Category::Beauty),
    ("세타필 대용량 로션 591ml", Category::Beauty),
    ("종근당 락토핏 골드 180포", Category::Beauty),
    ("아베다 샴푸 1L", Category::Beauty),
    ("바이오가이아 유산균", Category::Beauty),
    ("일리윤 세라마이드 아토 로션 500ml", Category::Beauty),
    ("센카 퍼펙트휩 클렌징폼 5개", Category::Beauty),
    ("실크테라피 헤어에센스 150ml", Category::Beauty),
    ("덴티스테 치약 200g 3개", Category::Beauty),
];

pub const SURNAMES: [&str; 12] = ["김", "이", "박", "최", "정", "강", "조", "윤", "장", "임", "한", "오"];

pub const GIVEN_NAMES: [&str; 16] = [
    "민준", "서연", "도윤", "지우", "하준", "서윤", "시우", "하은", "지호", "수아", "예준", "지민", "은우", "채원",
    "유진", "현우",
];

pub const NICKNAME_WORDS: [&str; 12] = [
    "알뜰", "모구", "공구러", "장보기", "살림꾼", "동네친구", "절약왕", "한봉지", "나눔이", "득템", "반띵", "소분러",
];
